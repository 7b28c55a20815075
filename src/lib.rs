#![warn(missing_docs)]
//! Load, clean, and analyze weather soundings, then plot them as skew-T log-P diagrams and
//! hodographs.
//!
//! A sounding comes in as a JSON document of feature records, one per level. The records are
//! extracted into index aligned series, cleaned against configured ranges, and tagged with
//! units. The full profile is used to derive parcel and stability parameters, while a copy
//! thinned to a fixed set of pressure levels is used for wind barbs and the hodograph.
//!
//! [`process`] runs all of these stages, [`render_skewt`] and [`render_hodograph`] draw the
//! charts.

//
// API
//
pub use crate::{
    analysis::{derive_parameters, DerivedParameters, ParamValue},
    clean::{clean, RangeConfig},
    config::{
        CategoryDisplay, Config, Functionalities, GeneralDisplay, HodographConfig,
        ParamDisplayConfig, SkewTConfig, UnitLabel,
    },
    display::{describe, format_value, panel_layout, PanelText},
    document::{load, load_json, Feature, SoundingDocument},
    error::{DataShortfall, Result, SoundingError},
    extract::{extract, ExtractedSeries, DEFAULT_MIN_POINTS},
    keys::{Field, Param, ParamCategory, Unit, ALL_FIELDS},
    parcel::{pressure_parcel, surface_parcel, Parcel},
    parcel_profile::{
        convective_condensation_level, lift_parcel, lifted_parcel_temperature,
        ParcelAscentAnalysis, ParcelProfile,
    },
    pipeline::{process, ProcessedSounding},
    render::{figure_pixels, render_hodograph, render_skewt, PIXELS_PER_INCH},
    units::{tag, TaggedSeries, UnitTaggedSeries},
    wind::subsample_for_display,
};

pub mod indexes;

//
// Internal use only
//
mod analysis;
mod clean;
mod config;
mod display;
mod document;
mod error;
mod extract;
mod interpolation;
mod keys;
mod parcel;
mod parcel_profile;
mod pipeline;
mod render;
mod units;
mod wind;
