use std::env;
use std::io;
use std::path;
use std::process;

use eelsdata::io::text_params::{TextParameters, TextParametersReader};
use eelsdata::io::{infer_format, AnaMapFile, EELSFormat, ParserError};
use eelsdata::params::ParamMap;
use eelsdata::prelude::*;
use eelsdata::spectrum::RawSpectrumRecord;
use eelsdata::{AnaMapReader, AnaReader, CsvReader, ElvReader, RawSpectraReader};

fn range(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        })
}

fn describe_parameters(params: &ParamMap) {
    for (name, value) in params.iter() {
        println!("  {name}: {value}");
    }
}

fn describe_spectrum(spectrum: &RawSpectrumRecord) {
    println!("Channels: {}", spectrum.len());
    if let (Some(first), Some(last)) = (spectrum.energies.first(), spectrum.energies.last()) {
        println!("Energy range: {first} to {last} eV");
    }
    println!("Header:");
    describe_parameters(&spectrum.header_parameters);
    if !spectrum.gain_corrections.is_empty() {
        let (lo, hi) = range(&spectrum.corrected_counts());
        println!("Corrected counts: {lo} to {hi}");
    }
}

fn describe_map(ana: &AnaMapFile) {
    let map = &ana.map;
    println!("Channels: {}", map.energies.len());
    println!("Points: {}", map.point_count());
    println!("Sections: {}", map.section_count());
    println!("Header:");
    describe_parameters(&map.header_parameters);
}

fn run(path: &path::Path) -> Result<(), ParserError> {
    let (format, is_gzipped) = infer_format(path)?;
    log::info!("{} is {format} (gzip: {is_gzipped})", path.display());
    match format {
        EELSFormat::Elv => describe_spectrum(&ElvReader::new().read_path(path)?.spectrum),
        EELSFormat::Ana => describe_spectrum(&AnaReader::new().read_path(path)?.spectrum),
        EELSFormat::AnaMap => describe_map(&AnaMapReader::new().read_path(path)?),
        EELSFormat::Csv => describe_spectrum(&CsvReader::new().read_path(path)?.to_spectrum()),
        EELSFormat::RawSpectra => {
            let spectra = RawSpectraReader::new().read_path(path)?;
            println!("Spectra: {}", spectra.len());
            if let Some(first) = spectra.first() {
                println!("Channels: {}", first.len());
            }
        }
        EELSFormat::TextParameters => match TextParametersReader.read_path(path)? {
            TextParameters::Elv(params) => describe_parameters(&params.items()),
            TextParameters::Map(params) => println!("{params:#?}"),
        },
        EELSFormat::Unknown => {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("Could not infer the format of {}", path.display()),
            )
            .into())
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let path = match env::args().nth(1) {
        Some(path) => path::PathBuf::from(path),
        None => {
            eprintln!("Please provide a path to an EELS data file");
            process::exit(1)
        }
    };
    println!("Path: {}", path.display());
    if let Err(e) = run(&path) {
        eprintln!("Failed to read {}: {e}", path.display());
        process::exit(1)
    }
}
