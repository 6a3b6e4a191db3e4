//! Ductband - HVAC path acoustic propagation
//!
//! Ductband takes a description of an air path - a noise source, the duct
//! segments and fittings between it and a terminal outlet - and computes
//! the octave-band sound spectrum, A-weighted level, and Noise-Criteria
//! (NC) rating delivered at the terminal.
//!
//! # Overview
//!
//! Duct-borne noise is a budget: the source spends dB into the path, duct
//! runs and the terminal's end reflection take some back, and every
//! fitting the air tears past adds its own regenerated noise. Ductband
//! walks the path element-by-element and keeps the books per octave band:
//!
//! ```text
//! fan (78dB @ 63Hz) --> 25ft lined duct --> elbow --> flex run --> 12in grille
//!                        -3dB/band-ish      +noise    -20dB mid     -12dB @ 63Hz
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use ductband::{PathEngine, Verdict};
//!
//! let data = std::fs::read_to_string("path.json").unwrap();
//! let requests = ductband::parse_requests(&data).unwrap();
//!
//! let engine = PathEngine::new().with_nc_target(35);
//! let result = engine.calculate(&requests[0]);
//!
//! match result.verdict {
//!     Verdict::Pass => println!("Meets NC-35"),
//!     Verdict::Marginal => println!("Within 5 points - review lining"),
//!     Verdict::Exceed => println!("Too loud: {}", result.nc),
//!     Verdict::Error => println!("Couldn't calculate: {:?}", result.error),
//! }
//!
//! println!("{:.1} dB(A) at the terminal", result.a_weighted_db);
//! ```
//!
//! # NC Ratings
//!
//! The NC rating is the lowest standard curve the terminal spectrum does
//! not exceed in any band - one hot band controls the rating:
//!
//! | Rating | Typical space |
//! |--------|----------------------------------|
//! | NC-20  | Concert hall, recording studio |
//! | NC-30  | Private office, classroom |
//! | NC-35  | Open-plan office |
//! | NC-40  | Corridor, lobby |
//! | NC-45+ | Kitchen, equipment-adjacent space |
//!
//! # Modules
//!
//! - [`spectrum`]: octave-band spectra and decibel arithmetic
//! - [`rating`]: NC curves and pass/fail verdicts
//! - [`request`]: the path-description input contract
//! - [`graph`]: adjacency model, source-to-terminal ordering, flow
//! - [`elements`]: per-element physics calculators
//! - [`engine`]: the propagation walk and batch runner
//! - [`report`]: CSV/JSON output formatters

pub mod elements;
pub mod engine;
pub mod graph;
pub mod rating;
pub mod report;
pub mod request;
pub mod spectrum;

pub use engine::{ElementTrace, PathEngine, PathResult};
pub use graph::PathError;
pub use rating::{NcRating, Verdict};
pub use request::{parse_requests, ComponentRecord, PathRequest, SegmentRecord};
pub use spectrum::{Spectrum, BAND_CENTERS_HZ, NUM_BANDS};
