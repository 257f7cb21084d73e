//! Event sink: structured notifications emitted while a simulation runs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Run parameters, recorded once before the first step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub pop_size: usize,
    pub vaccination_rate: f64,
    pub pathogen_name: String,
    pub lethality_probability: f64,
    pub transmission_probability: f64,
}

/// Outcome of a single interaction between a spreader and a partner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub spreader_id: usize,
    pub partner_id: usize,
    pub partner_was_infected: bool,
    pub partner_was_vaccinated: bool,
    pub transmission_occurred: bool,
}

/// Population counts after a completed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSummary {
    pub step_index: usize,
    pub living: usize,
    pub dead: usize,
    pub vaccinated: usize,
    pub currently_infected: usize,
}

/// Final state of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub steps: usize,
    pub living: usize,
    pub dead: usize,
    pub vaccinated: usize,
    pub currently_infected: usize,
    pub total_ever_infected: usize,
    pub total_dead: usize,
}

/// Receiver for simulation events.
///
/// The engine calls these at fixed points: metadata once before the first
/// step, an interaction record for every simulated interaction, a step
/// summary after each completed step, and a run summary on termination.
/// How (or whether) the events are persisted is up to the implementation.
pub trait EventSink {
    fn record_run_metadata(&mut self, metadata: &RunMetadata) -> Result<()>;
    fn record_interaction(&mut self, interaction: &Interaction) -> Result<()>;
    fn record_step_summary(&mut self, summary: &StepSummary) -> Result<()>;
    fn record_run_summary(&mut self, summary: &RunSummary) -> Result<()>;
}

/// Sink that discards every event.
///
/// Used by sweeps, where only the run summaries matter.
pub struct NullSink;

impl EventSink for NullSink {
    fn record_run_metadata(&mut self, _metadata: &RunMetadata) -> Result<()> {
        Ok(())
    }

    fn record_interaction(&mut self, _interaction: &Interaction) -> Result<()> {
        Ok(())
    }

    fn record_step_summary(&mut self, _summary: &StepSummary) -> Result<()> {
        Ok(())
    }

    fn record_run_summary(&mut self, _summary: &RunSummary) -> Result<()> {
        Ok(())
    }
}

/// Sink that writes one line per event to a writer.
pub struct TextLog<W: Write> {
    writer: W,
}

impl<W: Write> TextLog<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("failed to flush event log")
    }
}

impl<W: Write> EventSink for TextLog<W> {
    fn record_run_metadata(&mut self, metadata: &RunMetadata) -> Result<()> {
        writeln!(
            self.writer,
            "RUN pop_size={} vaccination_rate={} pathogen={} lethality={} transmission={}",
            metadata.pop_size,
            metadata.vaccination_rate,
            metadata.pathogen_name,
            metadata.lethality_probability,
            metadata.transmission_probability,
        )
        .context("failed to write run metadata")
    }

    fn record_interaction(&mut self, interaction: &Interaction) -> Result<()> {
        writeln!(
            self.writer,
            "INTERACTION spreader={} partner={} infected={} vaccinated={} transmission={}",
            interaction.spreader_id,
            interaction.partner_id,
            interaction.partner_was_infected,
            interaction.partner_was_vaccinated,
            interaction.transmission_occurred,
        )
        .context("failed to write interaction")
    }

    fn record_step_summary(&mut self, summary: &StepSummary) -> Result<()> {
        writeln!(
            self.writer,
            "STEP index={} living={} dead={} vaccinated={} infected={}",
            summary.step_index,
            summary.living,
            summary.dead,
            summary.vaccinated,
            summary.currently_infected,
        )
        .context("failed to write step summary")
    }

    fn record_run_summary(&mut self, summary: &RunSummary) -> Result<()> {
        writeln!(
            self.writer,
            "END steps={} living={} dead={} vaccinated={} infected={} \
             total_infected={} total_dead={}",
            summary.steps,
            summary.living,
            summary.dead,
            summary.vaccinated,
            summary.currently_infected,
            summary.total_ever_infected,
            summary.total_dead,
        )
        .context("failed to write run summary")
    }
}
