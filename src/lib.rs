/*!
 * # bilyric - bilingual time-coded lyrics
 *
 * A Rust library that turns an uploaded song into two synchronized lyric
 * tracks: the original language and a translation sharing the same timing.
 *
 * ## Features
 *
 * - Upload audio to a combined processing service, falling back to a
 *   transcription service when the primary one is unusable
 * - Split flat transcripts into caption lines and time them against the
 *   media duration
 * - Separate model reasoning (`<think>` and friends) from translated text
 * - Map translations line by line onto the original timing
 * - Store processed songs in a SQLite library and replay them
 * - Export results as JSON, SRT or LRC
 *
 * ## Architecture
 *
 * - `app_config`: `conf.json` settings and validation
 * - `lyrics`: Lyric lines and the processing result
 * - `captions`: Reasoning extraction, segmentation, timing and remapping
 * - `providers`: HTTP clients for the processing services:
 *   - `providers::process`: combined transcribe + translate service
 *   - `providers::transcribe`: transcription service
 *   - `providers::translate`: text translation service
 *   - `providers::mock`: scripted in-process services
 * - `pipeline`: Stage orchestration, fallback and diagnostics
 * - `database`: SQLite song library
 * - `file_utils`: Audio discovery, hashing and export paths
 * - `app_controller`: Single-song and folder runs, library replay, export
 * - `language_utils`: Language names and ISO 639 codes
 * - `errors`: Service, library and application errors
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod app_config;
pub mod app_controller;
pub mod captions;
pub mod database;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod lyrics;
pub mod pipeline;
pub mod providers;

pub use app_config::Config;
pub use app_controller::Controller;
pub use captions::{extract, ExtractionResult, TimelineBuilder};
pub use errors::{AppError, FailureCategory, LibraryError, ServiceCallOutcome, ServiceError};
pub use lyrics::{LyricLine, ProcessingResult};
pub use pipeline::{JobRequest, Orchestrator, ProcessingReport};
