//! Storing spectra in HDF5 files.
//!
//! Each container becomes a group named after it. Header parameters are stored
//! as attributes of a sub-group and channel arrays as one dimensional datasets.

use ::hdf5::types::{TypeDescriptor, VarLenUnicode};
use ::hdf5::Group;
use log::debug;
use ndarray::Array1;

use crate::params::{ParamMap, Value};

use super::error::ParserError;

/// Open the child group `name` of `parent`, failing if it is absent.
pub fn open_group(parent: &Group, name: &str) -> Result<Group, ParserError> {
    if parent.link_exists(name) {
        Ok(parent.group(name)?)
    } else {
        Err(ParserError::MissingSection(format!(
            "{} does not contain {name:?}",
            parent.name()
        )))
    }
}

/// Open the child group `name` of `parent`, creating it if it does not exist.
pub fn require_group(parent: &Group, name: &str) -> Result<Group, ParserError> {
    if parent.link_exists(name) {
        Ok(parent.group(name)?)
    } else {
        Ok(parent.create_group(name)?)
    }
}

fn to_unicode(text: &str) -> Result<VarLenUnicode, ParserError> {
    text.parse::<VarLenUnicode>()
        .map_err(|e| ::hdf5::Error::Internal(e.to_string()).into())
}

/// Write each parameter as an attribute of `group`
pub fn write_parameters(group: &Group, params: &ParamMap) -> Result<(), ParserError> {
    for (name, value) in params.iter() {
        let builder = group.new_attr_builder();
        match value {
            Value::String(s) => {
                let s = to_unicode(s)?;
                builder.with_data(&[s][..]).create(name.as_str())?;
            }
            Value::Int(i) => {
                builder.with_data(&[*i][..]).create(name.as_str())?;
            }
            Value::Float(x) => {
                builder.with_data(&[*x][..]).create(name.as_str())?;
            }
        }
    }
    Ok(())
}

/// Read every attribute of `group` back into a parameter map. Attributes of a
/// type no parameter is written as are skipped.
pub fn read_parameters(group: &Group) -> Result<ParamMap, ParserError> {
    let mut params = ParamMap::new();
    for name in group.attr_names()? {
        let attr = group.attr(&name)?;
        let value = match attr.dtype()?.to_descriptor()? {
            TypeDescriptor::VarLenUnicode => attr
                .read_raw::<VarLenUnicode>()?
                .into_iter()
                .next()
                .map(|s| Value::String(s.as_str().to_string())),
            TypeDescriptor::Integer(_) => attr.read_raw::<i64>()?.into_iter().next().map(Value::Int),
            TypeDescriptor::Float(_) => attr.read_raw::<f64>()?.into_iter().next().map(Value::Float),
            other => {
                debug!("Skipping attribute {name} of type {other:?}");
                None
            }
        };
        if let Some(value) = value {
            params.insert(name, value);
        }
    }
    Ok(params)
}

/// Write `values` as the dataset `name` of `group`
pub fn write_array(group: &Group, name: &str, values: &[f64]) -> Result<(), ParserError> {
    let data: Array1<f64> = Array1::from_vec(values.to_vec());
    group
        .new_dataset_builder()
        .with_data(data.view())
        .create(name)?;
    Ok(())
}

/// Read the dataset `name` of `group`, or an empty array if it is absent
pub fn read_array(group: &Group, name: &str) -> Result<Vec<f64>, ParserError> {
    if !group.link_exists(name) {
        debug!("No dataset {name} in {}", group.name());
        return Ok(Vec::new());
    }
    let values = group.dataset(name)?.read_1d::<f64>()?;
    Ok(values.to_vec())
}

/// Write a single text attribute
pub fn write_text_attribute(group: &Group, name: &str, text: &str) -> Result<(), ParserError> {
    let text = to_unicode(text)?;
    group
        .new_attr_builder()
        .with_data(&[text][..])
        .create(name)?;
    Ok(())
}

/// Read a single text attribute, if present
pub fn read_text_attribute(group: &Group, name: &str) -> Result<Option<String>, ParserError> {
    if !group.attr_names()?.iter().any(|n| n == name) {
        return Ok(None);
    }
    let values = group.attr(name)?.read_raw::<VarLenUnicode>()?;
    Ok(values.into_iter().next().map(|s| s.as_str().to_string()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test_log::test]
    fn test_parameters_and_arrays() -> Result<(), ParserError> {
        let tmpdir = tempfile::tempdir()?;
        let path = tmpdir.path().join("params.h5");
        let file = ::hdf5::File::create(&path)?;
        let group = require_group(&file, "spectrum")?;

        let mut params = ParamMap::new();
        params.insert("date".into(), Value::from("01/Mar/2017"));
        params.insert("magnification".into(), Value::Int(37443));
        params.insert("energy width (eV)".into(), Value::Float(7.0));
        write_parameters(&group, &params)?;
        write_array(&group, "energies eV", &[-1.0, 0.0, 1.0])?;
        write_text_attribute(&group, "author", "hdemers")?;

        let read_back = read_parameters(&group)?;
        assert_eq!(read_back.len(), 4);
        assert_eq!(read_back["date"], Value::from("01/Mar/2017"));
        assert_eq!(read_back["magnification"], Value::Int(37443));
        assert_eq!(read_back["energy width (eV)"], Value::Float(7.0));
        assert_eq!(read_array(&group, "energies eV")?, vec![-1.0, 0.0, 1.0]);
        assert!(read_array(&group, "raw counts")?.is_empty());
        assert_eq!(
            read_text_attribute(&group, "author")?.as_deref(),
            Some("hdemers")
        );
        assert_eq!(read_text_attribute(&group, "missing")?, None);

        let err = open_group(&file, "absent");
        assert!(matches!(err, Err(ParserError::MissingSection(_))));
        Ok(())
    }
}
