use crate::error::TuneResult;
use crate::oracle::corridor::FluxSample;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the `time;vehicle_flux` series of one episode.
pub fn write_flux_series<W: Write>(writer: W, samples: &[FluxSample]) -> TuneResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(["time", "vehicle_flux"])?;
    for s in samples {
        wtr.write_record([s.time.to_string(), s.vehicle_flux.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_flux_file<P: AsRef<Path>>(path: P, samples: &[FluxSample]) -> TuneResult<()> {
    let file = File::create(path)?;
    write_flux_series(file, samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semicolon_layout() {
        let samples = vec![
            FluxSample {
                time: 0,
                vehicle_flux: 0,
            },
            FluxSample {
                time: 300,
                vehicle_flux: 17,
            },
        ];
        let mut buf = Vec::new();
        write_flux_series(&mut buf, &samples).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "time;vehicle_flux\n0;0\n300;17\n");
    }
}
