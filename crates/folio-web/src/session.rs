#![forbid(unsafe_code)]

//! Deterministic session recording and replay.
//!
//! Provides [`SessionRecorder`] for recording input events, time steps, and
//! presented command batches during a page session, and [`replay`] for
//! replaying them through a fresh [`PageProgram`] to verify that every batch
//! checksum matches exactly.
//!
//! # Determinism contract
//!
//! Given identical recorded inputs and the same configuration, replay
//! **must** produce identical batch checksums on the same build. This is
//! guaranteed by:
//!
//! 1. The clock is host-driven: time only moves when a tick record says so.
//! 2. Events are host-driven: nothing is polled, every input comes from the
//!    trace.
//! 3. Handlers are deterministic: the same state and event always produce
//!    the same commands, hence the same checksum.

use core::time::Duration;
use std::collections::VecDeque;

use folio_core::event::PageEvent;
use folio_core::geometry::Viewport;

use crate::page_program::{PageConfig, PageDom, PageError, PageProgram, StepResult};

/// Schema version for session traces.
pub const SCHEMA_VERSION: &str = "folio-trace-v1";

// FNV-1a constants, identical to the batch checksum in lib.rs.
const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a64_u64(mut hash: u64, v: u64) -> u64 {
    for &b in &v.to_le_bytes() {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn chain_checksum(prev: u64, next: u64) -> u64 {
    let hash = fnv1a64_u64(FNV_OFFSET_BASIS, prev);
    fnv1a64_u64(hash, next)
}

/// A single record in a session trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceRecord {
    /// Session header (must be first).
    Header {
        /// Trace schema version ([`SCHEMA_VERSION`]).
        schema: String,
        /// Initial viewport size.
        viewport: Viewport,
        /// Stored theme preference fed to `init`.
        stored_preference: Option<String>,
    },
    /// An input event at a specific timestamp.
    Input {
        /// Monotonic timestamp in nanoseconds.
        ts_ns: u64,
        /// The pushed event.
        event: PageEvent,
    },
    /// Explicit time advancement.
    Tick {
        /// Monotonic time after the advancement, in nanoseconds.
        ts_ns: u64,
    },
    /// A presented command batch with its checksum.
    Batch {
        /// Zero-based batch index.
        batch_idx: u64,
        /// Monotonic timestamp in nanoseconds.
        ts_ns: u64,
        /// Checksum of the batch payload.
        checksum: u64,
        /// Running checksum chain up to and including this batch.
        checksum_chain: u64,
    },
    /// Trace summary (must be last).
    Summary {
        /// Total batches recorded.
        total_batches: u64,
        /// Final checksum chain value.
        final_checksum_chain: u64,
    },
}

/// Trace validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// The trace has no records.
    EmptyTrace,
    /// The first record is not a header.
    MissingHeader,
    /// The header carries a schema this build does not understand.
    UnsupportedSchema {
        /// Schema found in the header.
        found: String,
    },
    /// The trace has no summary, or the summary is not the last record.
    MissingSummary,
    /// Batch indices are not contiguous from zero.
    NonContiguousBatch {
        /// Index expected at this position.
        expected: u64,
        /// Index found.
        found: u64,
    },
    /// A batch's chain value does not follow from its predecessor.
    BrokenChain {
        /// The offending batch index.
        batch_idx: u64,
    },
    /// The summary totals do not match the recorded batches.
    SummaryMismatch,
}

impl core::fmt::Display for TraceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyTrace => write!(f, "trace is empty"),
            Self::MissingHeader => write!(f, "first record is not a header"),
            Self::UnsupportedSchema { found } => {
                write!(f, "unsupported trace schema {found:?}")
            }
            Self::MissingSummary => write!(f, "summary missing or not last"),
            Self::NonContiguousBatch { expected, found } => {
                write!(f, "batch index {found} where {expected} was expected")
            }
            Self::BrokenChain { batch_idx } => {
                write!(f, "checksum chain broken at batch {batch_idx}")
            }
            Self::SummaryMismatch => write!(f, "summary does not match recorded batches"),
        }
    }
}

impl std::error::Error for TraceError {}

/// A complete recorded session trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTrace {
    /// Records in recording order.
    pub records: Vec<TraceRecord>,
}

impl SessionTrace {
    /// Number of batch checkpoints in the trace.
    #[must_use]
    pub fn batch_count(&self) -> u64 {
        self.records
            .iter()
            .filter(|r| matches!(r, TraceRecord::Batch { .. }))
            .count() as u64
    }

    /// Extract the final checksum chain from the summary record.
    #[must_use]
    pub fn final_checksum_chain(&self) -> Option<u64> {
        self.records.iter().rev().find_map(|r| match r {
            TraceRecord::Summary {
                final_checksum_chain,
                ..
            } => Some(*final_checksum_chain),
            _ => None,
        })
    }

    /// Validate structural invariants for a recorded trace.
    ///
    /// Checks that the header is first, the summary is last, batch indices
    /// are contiguous from zero, the checksum chain is internally
    /// consistent, and the summary matches the batches.
    pub fn validate(&self) -> Result<(), TraceError> {
        if self.records.is_empty() {
            return Err(TraceError::EmptyTrace);
        }
        let TraceRecord::Header { schema, .. } = &self.records[0] else {
            return Err(TraceError::MissingHeader);
        };
        if schema != SCHEMA_VERSION {
            return Err(TraceError::UnsupportedSchema {
                found: schema.clone(),
            });
        }
        let Some(TraceRecord::Summary {
            total_batches,
            final_checksum_chain,
        }) = self.records.last()
        else {
            return Err(TraceError::MissingSummary);
        };

        let mut expected_idx: u64 = 0;
        let mut chain: u64 = 0;
        for record in &self.records[..self.records.len() - 1] {
            match record {
                TraceRecord::Summary { .. } => return Err(TraceError::MissingSummary),
                TraceRecord::Batch {
                    batch_idx,
                    checksum,
                    checksum_chain,
                    ..
                } => {
                    if *batch_idx != expected_idx {
                        return Err(TraceError::NonContiguousBatch {
                            expected: expected_idx,
                            found: *batch_idx,
                        });
                    }
                    chain = chain_checksum(chain, *checksum);
                    if chain != *checksum_chain {
                        return Err(TraceError::BrokenChain {
                            batch_idx: *batch_idx,
                        });
                    }
                    expected_idx += 1;
                }
                _ => {}
            }
        }

        if *total_batches != expected_idx || *final_checksum_chain != chain {
            return Err(TraceError::SummaryMismatch);
        }
        Ok(())
    }
}

/// Records a page session for later replay.
///
/// Wraps a [`PageProgram`], mirroring every input and presented batch into
/// a [`SessionTrace`].
#[derive(Debug)]
pub struct SessionRecorder {
    program: PageProgram,
    records: Vec<TraceRecord>,
    chain: u64,
    batch_idx: u64,
}

impl SessionRecorder {
    /// Create a recorder, initialize the program, and record the header.
    ///
    /// # Errors
    ///
    /// Propagates [`PageError`] from program construction.
    pub fn new(
        dom: &PageDom,
        config: PageConfig,
        viewport: Viewport,
        stored_preference: Option<&str>,
    ) -> Result<Self, PageError> {
        let mut program = PageProgram::new(dom, config, viewport)?;
        program.init(stored_preference);
        let mut recorder = Self {
            program,
            records: vec![TraceRecord::Header {
                schema: SCHEMA_VERSION.to_owned(),
                viewport,
                stored_preference: stored_preference.map(str::to_owned),
            }],
            chain: 0,
            batch_idx: 0,
        };
        recorder.collect_batches();
        Ok(recorder)
    }

    /// Push an event, recording it.
    pub fn push_event(&mut self, event: PageEvent) {
        self.records.push(TraceRecord::Input {
            ts_ns: self.now_ns(),
            event,
        });
        self.program.push_event(event);
    }

    /// Advance time, recording the new absolute timestamp.
    pub fn advance_time(&mut self, dt: Duration) {
        self.program.advance_time(dt);
        self.records.push(TraceRecord::Tick {
            ts_ns: self.now_ns(),
        });
    }

    /// Step the program and record any presented batches.
    pub fn step(&mut self) -> StepResult {
        let result = self.program.step();
        self.collect_batches();
        result
    }

    /// Read access to the wrapped program.
    #[must_use]
    pub fn program(&self) -> &PageProgram {
        &self.program
    }

    /// Finish recording and produce the trace.
    #[must_use]
    pub fn finish(mut self) -> SessionTrace {
        self.records.push(TraceRecord::Summary {
            total_batches: self.batch_idx,
            final_checksum_chain: self.chain,
        });
        SessionTrace {
            records: self.records,
        }
    }

    fn now_ns(&self) -> u64 {
        u64::try_from(self.program.now().as_nanos()).unwrap_or(u64::MAX)
    }

    fn collect_batches(&mut self) {
        let ts_ns = self.now_ns();
        for batch in self.program.take_outputs().batches {
            self.chain = chain_checksum(self.chain, batch.checksum);
            self.records.push(TraceRecord::Batch {
                batch_idx: self.batch_idx,
                ts_ns,
                checksum: batch.checksum,
                checksum_chain: self.chain,
            });
            self.batch_idx += 1;
        }
    }
}

/// One checksum divergence found during replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayMismatch {
    /// The diverging batch index.
    pub batch_idx: u64,
    /// Checksum recorded in the trace.
    pub expected: u64,
    /// Checksum produced by the replay (`None`: no batch was produced).
    pub actual: Option<u64>,
}

/// Outcome of a replay run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayResult {
    /// Batches compared.
    pub batches: u64,
    /// Divergences, in batch order.
    pub mismatches: Vec<ReplayMismatch>,
}

impl ReplayResult {
    /// Whether the replay reproduced every checksum.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Replay error.
#[derive(Debug)]
pub enum ReplayError {
    /// The trace failed validation.
    Trace(TraceError),
    /// The program could not be constructed.
    Page(PageError),
}

impl core::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Trace(e) => write!(f, "invalid trace: {e}"),
            Self::Page(e) => write!(f, "page error: {e}"),
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Trace(e) => Some(e),
            Self::Page(e) => Some(e),
        }
    }
}

impl From<TraceError> for ReplayError {
    fn from(e: TraceError) -> Self {
        Self::Trace(e)
    }
}

impl From<PageError> for ReplayError {
    fn from(e: PageError) -> Self {
        Self::Page(e)
    }
}

/// Replay a trace through a fresh program and compare batch checksums.
///
/// # Errors
///
/// Returns [`ReplayError`] when the trace is structurally invalid or the
/// program cannot be constructed; checksum divergence is reported in the
/// [`ReplayResult`] instead.
pub fn replay(
    dom: &PageDom,
    config: PageConfig,
    trace: &SessionTrace,
) -> Result<ReplayResult, ReplayError> {
    trace.validate()?;

    let TraceRecord::Header {
        viewport,
        stored_preference,
        ..
    } = &trace.records[0]
    else {
        return Err(TraceError::MissingHeader.into());
    };

    let mut program = PageProgram::new(dom, config, *viewport)?;
    program.init(stored_preference.as_deref());

    let mut produced: VecDeque<u64> = program
        .take_outputs()
        .batches
        .iter()
        .map(|b| b.checksum)
        .collect();

    let mut batches: u64 = 0;
    let mut mismatches = Vec::new();
    for record in &trace.records[1..] {
        match record {
            TraceRecord::Input { event, .. } => program.push_event(*event),
            TraceRecord::Tick { ts_ns } => {
                program.set_time(Duration::from_nanos(*ts_ns));
            }
            TraceRecord::Batch {
                batch_idx,
                checksum,
                ..
            } => {
                if produced.is_empty() {
                    program.step();
                    produced.extend(
                        program.take_outputs().batches.iter().map(|b| b.checksum),
                    );
                }
                batches += 1;
                match produced.pop_front() {
                    Some(actual) if actual == *checksum => {}
                    actual => mismatches.push(ReplayMismatch {
                        batch_idx: *batch_idx,
                        expected: *checksum,
                        actual,
                    }),
                }
            }
            TraceRecord::Header { .. } | TraceRecord::Summary { .. } => {}
        }
    }

    Ok(ReplayResult {
        batches,
        mismatches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_program::{CardBinding, NavLink, SectionBinding};
    use folio_core::event::NodeId;

    use pretty_assertions::assert_eq;

    const TOGGLE: NodeId = NodeId(1);

    fn dom() -> PageDom {
        PageDom {
            body: NodeId(0),
            theme_toggle: Some(TOGGLE),
            theme_indicator: Some(NodeId(2)),
            nav_links: vec![
                NavLink {
                    link: NodeId(3),
                    target: Some(NodeId(5)),
                },
                NavLink {
                    link: NodeId(4),
                    target: Some(NodeId(6)),
                },
            ],
            sections: vec![
                SectionBinding {
                    node: NodeId(5),
                    top: 0,
                },
                SectionBinding {
                    node: NodeId(6),
                    top: 900,
                },
            ],
            reveal_targets: vec![NodeId(8)],
            cards: vec![CardBinding {
                node: NodeId(7),
                title: None,
            }],
        }
    }

    fn record_toggle_session() -> SessionTrace {
        let mut recorder = SessionRecorder::new(
            &dom(),
            PageConfig::default(),
            Viewport::new(1280, 720),
            None,
        )
        .unwrap();

        recorder.push_event(PageEvent::click(TOGGLE));
        recorder.advance_time(Duration::from_millis(16));
        recorder.step();

        recorder.push_event(PageEvent::Scroll { y: 800 });
        recorder.advance_time(Duration::from_millis(16));
        recorder.step();

        recorder.finish()
    }

    #[test]
    fn recorded_trace_validates() {
        let trace = record_toggle_session();
        trace.validate().unwrap();
        // init batch + toggle batch + scroll batch
        assert_eq!(trace.batch_count(), 3);
        assert!(trace.final_checksum_chain().is_some());
    }

    #[test]
    fn replay_reproduces_all_checksums() {
        let trace = record_toggle_session();
        let result = replay(
            &dom(),
            PageConfig::default(),
            &trace,
        )
        .unwrap();
        assert!(result.ok(), "mismatches: {:?}", result.mismatches);
        assert_eq!(result.batches, 3);
    }

    #[test]
    fn tampered_checksum_is_detected_by_validate() {
        let mut trace = record_toggle_session();
        for record in &mut trace.records {
            if let TraceRecord::Batch { checksum, .. } = record {
                *checksum ^= 1;
                break;
            }
        }
        assert!(matches!(
            trace.validate(),
            Err(TraceError::BrokenChain { batch_idx: 0 })
        ));
    }

    #[test]
    fn divergent_replay_reports_mismatch() {
        let trace = record_toggle_session();

        // Replay against a DOM whose section tops differ: the scroll batch
        // diverges.
        let mut other = dom();
        other.sections[1].top = 2000;
        let result = replay(
            &other,
            PageConfig::default(),
            &trace,
        )
        .unwrap();
        assert!(!result.ok());
    }

    #[test]
    fn foreign_schema_is_rejected() {
        let mut trace = record_toggle_session();
        if let TraceRecord::Header { schema, .. } = &mut trace.records[0] {
            "folio-trace-v2".clone_into(schema);
        }
        assert!(matches!(
            trace.validate(),
            Err(TraceError::UnsupportedSchema { .. })
        ));
    }

    #[test]
    fn empty_trace_fails_validation() {
        let trace = SessionTrace {
            records: Vec::new(),
        };
        assert_eq!(trace.validate(), Err(TraceError::EmptyTrace));
    }

    #[test]
    fn summary_must_match_batches() {
        let mut trace = record_toggle_session();
        if let Some(TraceRecord::Summary { total_batches, .. }) = trace.records.last_mut() {
            *total_batches += 1;
        }
        assert_eq!(trace.validate(), Err(TraceError::SummaryMismatch));
    }
}
