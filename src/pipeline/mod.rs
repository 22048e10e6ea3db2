/*!
 * Processing pipeline for uploaded songs.
 *
 * The pipeline turns one audio upload into a bilingual `ProcessingResult`:
 * 1. **Orchestration**: call the services in order with deadlines and fallback
 * 2. **Synchronization**: segment, time and remap the returned text
 * 3. **Diagnostics**: word a three-line result when every stage failed
 */

pub mod diagnostics;
pub mod orchestrator;

// Re-export types used externally
pub use diagnostics::{diagnostic_lines, failure_result, DIAGNOSTIC_LINE_SECS};
pub use orchestrator::{
    HttpOrchestrator, JobRequest, Orchestrator, OrchestratorConfig, ProcessingReport, Stage, StageAttempt,
};
