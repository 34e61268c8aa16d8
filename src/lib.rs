//! Intelligent Resume Screener API Library
//!
//! This library provides the core functionality for the resume screening
//! service: PDF text extraction, model-driven résumé data extraction and
//! job-description matching, and the HTTP handlers tying them together.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `extraction`: Structured résumé data extraction.
//! - `gemini`: Gemini generateContent client.
//! - `handlers`: HTTP request handlers.
//! - `matching`: Résumé/job-description match scoring.
//! - `model_json`: JSON extraction from free-text model output.
//! - `pdf`: PDF text extraction.

pub mod config;
pub mod errors;
pub mod extraction;
pub mod gemini;
pub mod handlers;
pub mod matching;
pub mod model_json;
pub mod pdf;
