use crate::config::Config;
use crate::engine::Engine;
use crate::report::TextLog;
use crate::sweep::{self, SweepOptions};
use anyhow::{Context, Result};
use glob::glob;
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

pub struct Manager {
    sim_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(sim_dir: P) -> Result<Self> {
        let sim_dir = sim_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(sim_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { sim_dir, cfg })
    }

    pub fn run_simulation(&self) -> Result<()> {
        let run_idx = self.count_run_logs().context("failed to count run logs")?;

        let mut engine = Engine::new(&self.cfg).context("failed to construct engine")?;

        let log_file = self.event_log_file(run_idx);
        let file =
            File::create(&log_file).with_context(|| format!("failed to create {log_file:?}"))?;
        let mut sink = TextLog::new(BufWriter::new(file));
        let summary = engine.run(&mut sink).context("failed to run simulation")?;
        sink.flush()?;

        let summary_file = self.summary_file(run_idx);
        let file = File::create(&summary_file)
            .with_context(|| format!("failed to create {summary_file:?}"))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &summary)
            .context("failed to serialize run summary")?;

        log::info!(
            "run {run_idx} ended after {} steps: {} dead, {} ever infected",
            summary.steps,
            summary.total_dead,
            summary.total_ever_infected
        );

        Ok(())
    }

    pub fn run_sweep(&self, opts: &SweepOptions) -> Result<()> {
        let points = sweep::run_sweep(&self.cfg, opts).context("failed to run sweep")?;

        let sweep_file = self.sim_dir.join("sweep.json");
        let file = File::create(&sweep_file)
            .with_context(|| format!("failed to create {sweep_file:?}"))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &points)
            .context("failed to serialize sweep results")?;
        log::info!("wrote {} sweep points to {sweep_file:?}", points.len());

        Ok(())
    }

    pub fn clean_sim(&self) -> Result<()> {
        for pattern in ["run-*.log", "run-*.json", "sweep.json"] {
            let pattern = self.sim_dir.join(pattern);
            let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
            for path in glob(pattern)
                .context("failed to glob generated files")?
                .filter_map(Result::ok)
            {
                fs::remove_file(&path).with_context(|| format!("failed to remove {path:?}"))?;
                log::info!("removed {path:?}");
            }
        }
        Ok(())
    }

    fn count_run_logs(&self) -> Result<usize> {
        let pattern = self.sim_dir.join("run-*.log");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let count = glob(pattern)
            .context("failed to glob run logs")?
            .filter_map(Result::ok)
            .count();
        Ok(count)
    }

    fn event_log_file(&self, run_idx: usize) -> PathBuf {
        self.sim_dir.join(format!("run-{run_idx:04}.log"))
    }

    fn summary_file(&self, run_idx: usize) -> PathBuf {
        self.sim_dir.join(format!("run-{run_idx:04}.json"))
    }
}
