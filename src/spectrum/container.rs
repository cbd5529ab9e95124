//! Named containers grouping spectra with the parameters they were recorded
//! with, and their HDF5 representation.

use std::path::Path;

use log::debug;

use crate::io::{EELSFileReader, ElvReader, ElvTextReader, FileSource, ParserError};
use crate::params::ParamMap;

use super::correction::corrected_counts;
use super::raw::RawSpectrumRecord;

pub const HDF5_GROUP_EXTRA_PARAMETERS: &str = "extra parameters";
pub const HDF5_GROUP_EELS_PARAMETERS: &str = "eels parameters";
pub const HDF5_DATASET_ENERGIES_EV: &str = "energies eV";
pub const HDF5_DATASET_RAW_COUNTS: &str = "raw counts";
pub const HDF5_DATASET_GAIN_CORRECTIONS: &str = "gain corrections";
pub const HDF5_DATASET_DARK_CURRENTS: &str = "dark currents";

pub const HDF5_ATTRIBUTE_AUTHOR: &str = "author";
pub const HDF5_GROUP_SPECTRA: &str = "spectra";

/// A named spectrum with the parameters of its acquisition.
///
/// `eels_parameters` holds what the instrument recorded, `extra_parameters`
/// whatever the caller attaches on import.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawSpectrum {
    pub name: String,
    pub extra_parameters: ParamMap,
    pub eels_parameters: ParamMap,
    pub energies: Vec<f64>,
    pub raw_counts: Vec<f64>,
    pub gain_corrections: Vec<f64>,
    pub dark_currents: Vec<f64>,
}

impl RawSpectrum {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build a container named after the file stem from a record that has
    /// already been read.
    pub fn from_record<S: Into<String>>(name: S, record: RawSpectrumRecord) -> Self {
        Self {
            name: name.into(),
            extra_parameters: ParamMap::new(),
            eels_parameters: record.header_parameters,
            energies: record.energies,
            raw_counts: record.raw_counts,
            gain_corrections: record.gain_corrections,
            dark_currents: record.dark_currents,
        }
    }

    /// Read the `.elv` file at `path` and the text parameter file beside it,
    /// merging the parameters of both into `eels_parameters`. `extra` is merged
    /// into `extra_parameters`.
    pub fn import_data<P: AsRef<Path>>(
        &mut self,
        path: P,
        extra: Option<&ParamMap>,
    ) -> Result<(), ParserError> {
        let path = path.as_ref();
        if let Some(extra) = extra {
            self.extra_parameters
                .extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        let elv = ElvReader::new().read_path(path)?;
        self.eels_parameters.extend(elv.parameters());
        let spectrum = elv.into_spectrum();
        self.energies = spectrum.energies;
        self.raw_counts = spectrum.raw_counts;
        self.gain_corrections = spectrum.gain_corrections;
        self.dark_currents = spectrum.dark_currents;

        let source = FileSource::from_path(path);
        let sidecar = source.sidecar_file_name().ok_or_else(|| {
            ParserError::MissingSection(format!("no parameter file name for {}", path.display()))
        })?;
        debug!("Reading parameters from {}", sidecar.display());
        let text_params = ElvTextReader.read_path(&sidecar)?;
        self.eels_parameters.extend(text_params.items());
        Ok(())
    }

    /// The net counts of each channel, `(raw - dark) / gain`
    pub fn counts(&self) -> Vec<f64> {
        corrected_counts(&self.raw_counts, &self.dark_currents, &self.gain_corrections)
    }

    pub fn len(&self) -> usize {
        self.energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }
}

/// A named collection of spectra
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Project {
    pub name: String,
    pub author: String,
    pub spectra: Vec<RawSpectrum>,
}

impl Project {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_spectrum(&mut self, spectrum: RawSpectrum) {
        self.spectra.push(spectrum);
    }

    pub fn get_spectrum(&self, name: &str) -> Option<&RawSpectrum> {
        self.spectra.iter().find(|s| s.name == name)
    }
}

#[cfg(feature = "hdf5")]
mod storage {
    use hdf5::Group;

    use crate::io::hdf5::{
        open_group, read_array, read_parameters, read_text_attribute, require_group, write_array,
        write_parameters, write_text_attribute,
    };
    use crate::io::ParserError;

    use super::*;

    impl RawSpectrum {
        /// Write this spectrum into a new group of `parent` named after it
        pub fn write_hdf5(&self, parent: &Group) -> Result<(), ParserError> {
            let group = require_group(parent, &self.name)?;
            if !self.extra_parameters.is_empty() {
                let params = require_group(&group, HDF5_GROUP_EXTRA_PARAMETERS)?;
                write_parameters(&params, &self.extra_parameters)?;
            }
            if !self.eels_parameters.is_empty() {
                let params = require_group(&group, HDF5_GROUP_EELS_PARAMETERS)?;
                write_parameters(&params, &self.eels_parameters)?;
            }
            for (name, values) in [
                (HDF5_DATASET_ENERGIES_EV, &self.energies),
                (HDF5_DATASET_RAW_COUNTS, &self.raw_counts),
                (HDF5_DATASET_GAIN_CORRECTIONS, &self.gain_corrections),
                (HDF5_DATASET_DARK_CURRENTS, &self.dark_currents),
            ] {
                if !values.is_empty() {
                    write_array(&group, name, values)?;
                }
            }
            Ok(())
        }

        /// Read the group of `parent` named after this spectrum. Fails with
        /// [`ParserError::MissingSection`] if there is none.
        pub fn read_hdf5(&mut self, parent: &Group) -> Result<(), ParserError> {
            let group = open_group(parent, &self.name)?;
            if group.link_exists(HDF5_GROUP_EXTRA_PARAMETERS) {
                let params = group.group(HDF5_GROUP_EXTRA_PARAMETERS)?;
                self.extra_parameters.extend(read_parameters(&params)?);
            }
            if group.link_exists(HDF5_GROUP_EELS_PARAMETERS) {
                let params = group.group(HDF5_GROUP_EELS_PARAMETERS)?;
                self.eels_parameters.extend(read_parameters(&params)?);
            }
            self.energies = read_array(&group, HDF5_DATASET_ENERGIES_EV)?;
            self.raw_counts = read_array(&group, HDF5_DATASET_RAW_COUNTS)?;
            self.gain_corrections = read_array(&group, HDF5_DATASET_GAIN_CORRECTIONS)?;
            self.dark_currents = read_array(&group, HDF5_DATASET_DARK_CURRENTS)?;
            Ok(())
        }
    }

    impl Project {
        pub fn write_hdf5(&self, parent: &Group) -> Result<(), ParserError> {
            let group = require_group(parent, &self.name)?;
            write_text_attribute(&group, HDF5_ATTRIBUTE_AUTHOR, &self.author)?;
            if !self.spectra.is_empty() {
                let spectra = require_group(&group, HDF5_GROUP_SPECTRA)?;
                for spectrum in self.spectra.iter() {
                    spectrum.write_hdf5(&spectra)?;
                }
            }
            Ok(())
        }

        /// Read the project group of `parent` named after this project, loading
        /// every spectrum it holds.
        pub fn read_hdf5(&mut self, parent: &Group) -> Result<(), ParserError> {
            let group = open_group(parent, &self.name)?;
            self.author = read_text_attribute(&group, HDF5_ATTRIBUTE_AUTHOR)?.unwrap_or_default();
            if group.link_exists(HDF5_GROUP_SPECTRA) {
                let spectra = group.group(HDF5_GROUP_SPECTRA)?;
                for name in spectra.member_names()? {
                    let mut spectrum = RawSpectrum::new(name);
                    spectrum.read_hdf5(&spectra)?;
                    self.spectra.push(spectrum);
                }
            }
            Ok(())
        }
    }
}
