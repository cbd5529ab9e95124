//! The parameter labels used when exporting header values, shared by the
//! in-memory parameter maps and the HDF5 attribute groups.

pub const COMMENT: &str = "comment";
pub const DATE: &str = "date";
pub const TIME: &str = "time";
pub const ENERGY_WIDTH_EV: &str = "energy width (eV)";
pub const ENERGY_LOSS_EV: &str = "energy loss (eV)";
pub const ACQUISITION_SPEED: &str = "acquisition speed";

pub const RAW: &str = "raw";
pub const DUAL_DET_POSITION: &str = "dual_det_position";
pub const DUAL_DET_POST: &str = "dual_det_post";
pub const DUAL_DET_CENTER: &str = "dual_det_center";

pub const Q1: &str = "q1";
pub const Q1S: &str = "q1s";
pub const Q2: &str = "q2";
pub const Q2S: &str = "q2s";
pub const Q3: &str = "q3";
pub const Q3S: &str = "q3s";
pub const H1: &str = "h1";
pub const H1S: &str = "h1s";
pub const H2: &str = "h2";
pub const H2S: &str = "h2s";
pub const H3: &str = "h3";
pub const H3S: &str = "h3s";
pub const H4: &str = "h4";

pub const ELV_X: &str = "elv_x";
pub const ELV_Y: &str = "elv_y";
pub const SPECTRUM_ALIGNMENT_X: &str = "spectrum_alignment_x";
pub const SPECTRUM_ALIGNMENT_Y: &str = "spectrum_alignment_y";
pub const DET_SPEC_ALIGNMENT_X: &str = "det_spec_alignment_x";
pub const DET_SPEC_ALIGNMENT_Y: &str = "det_spec_alignment_y";
pub const DET_MAP_ALIGNMENT_X: &str = "det_map_alignment_x";
pub const DET_MAP_ALIGNMENT_Y: &str = "det_map_alignment_y";

pub const MAGNIFICATION: &str = "magnification";

/// Labels used by the text parameter file written next to a spectrum
pub mod sidecar {
    pub const MODEL: &str = "model";
    pub const SAMPLE_HEIGHT_MM: &str = "sample height (mm)";
    pub const FILEPATH: &str = "filepath";
    pub const COMMENT: &str = "comment";
    pub const DATE: &str = "date";
    pub const TIME: &str = "time";
    pub const ACCELERATING_VOLTAGE_V: &str = "accelerating voltage (V)";
    pub const ENERGY_WIDTH_EV: &str = "energy width (eV)";
    pub const ENERGY_LOSS_EV: &str = "energy loss (eV)";
    pub const SPEED_US: &str = "speed (us)";
}
