//! Integration tests for pairing scalar files with their track files.

use std::fs::File;
use std::path::Path;

use track_scalars::tsf::{
    check_properties_match, write_header, FileKind, PAIRED_SCALAR_FILES, TRACK_SCALARS,
};
use track_scalars::{Error, Properties, Result, ScalarReader, ScalarType, ScalarWriter, WriterConfig};

use tempfile::tempdir;

/// Write a track file header only; geometry is not needed for pairing.
fn write_tracks(path: &Path, props: &Properties) -> Result<()> {
    let mut file = File::create(path)?;
    write_header(&mut file, FileKind::Tracks, props, ScalarType::Float32LE)?;
    Ok(())
}

fn write_scalars(path: &Path, tracks: &Properties, sequences: &[Vec<f32>]) -> Result<()> {
    let props = Properties::paired_with(tracks);
    let mut writer = ScalarWriter::<f32>::create(path, &props, WriterConfig::default())?;
    for seq in sequences {
        writer.append(seq)?;
    }
    writer.close()
}

#[test]
fn test_scalars_match_their_tracks() -> Result<()> {
    let dir = tempdir()?;
    let tck = dir.path().join("fibres.tck");
    let tsf = dir.path().join("fa.tsf");

    let mut tracks = Properties::new();
    tracks.set("algorithm", "iFOD2")?;
    tracks.set_count(2);
    tracks.set_total_count(2);
    write_tracks(&tck, &tracks)?;

    let loaded = Properties::load(&tck)?;
    assert_eq!(loaded.timestamp(), tracks.timestamp());
    assert_eq!(loaded.count(), 2);

    write_scalars(&tsf, &loaded, &[vec![0.1, 0.2], vec![0.3]])?;

    let reader = ScalarReader::<f32>::open(&tsf)?;
    check_properties_match(&loaded, reader.properties(), TRACK_SCALARS, true)?;
    assert_eq!(reader.properties().get("algorithm"), Some("iFOD2"));
    Ok(())
}

#[test]
fn test_scalars_from_other_tracks_rejected() -> Result<()> {
    let dir = tempdir()?;
    let tsf = dir.path().join("fa.tsf");

    let first = Properties::with_timestamp("1700000000.000000001");
    let second = Properties::with_timestamp("1700000000.000000002");
    write_scalars(&tsf, &first, &[vec![1.0]])?;

    let scalars = Properties::load(&tsf)?;
    for strict in [true, false] {
        let err = check_properties_match(&second, &scalars, TRACK_SCALARS, strict).unwrap_err();
        assert!(matches!(err, Error::ProvenanceMismatch { .. }));
        assert!(err.to_string().contains(TRACK_SCALARS));
    }
    Ok(())
}

#[test]
fn test_paired_scalar_files_count_policy() -> Result<()> {
    let dir = tempdir()?;
    let a = dir.path().join("a.tsf");
    let b = dir.path().join("b.tsf");

    let tracks = Properties::with_timestamp("1234.5");
    write_scalars(&a, &tracks, &[vec![1.0], vec![2.0], vec![3.0]])?;
    write_scalars(&b, &tracks, &[vec![1.0], vec![], vec![3.0]])?;

    let pa = Properties::load(&a)?;
    let pb = Properties::load(&b)?;
    assert_eq!(pa.count(), 3);
    assert_eq!(pb.count(), 2);
    assert_eq!(pb.total_count(), 3);

    let err = check_properties_match(&pa, &pb, PAIRED_SCALAR_FILES, true).unwrap_err();
    assert!(matches!(err, Error::CountMismatch { left: 3, right: 2, .. }));

    check_properties_match(&pa, &pb, PAIRED_SCALAR_FILES, false)?;
    Ok(())
}

#[test]
fn test_incomplete_scalars_detected_by_count() -> Result<()> {
    let dir = tempdir()?;
    let tck = dir.path().join("fibres.tck");
    let tsf = dir.path().join("partial.tsf");

    let mut tracks = Properties::with_timestamp("99.0");
    tracks.set_count(4);
    write_tracks(&tck, &tracks)?;

    let loaded = Properties::load(&tck)?;
    write_scalars(&tsf, &loaded, &[vec![1.0], vec![2.0]])?;

    let scalars = Properties::load(&tsf)?;
    assert!(check_properties_match(&loaded, &scalars, TRACK_SCALARS, true).is_err());
    assert!(check_properties_match(&loaded, &scalars, TRACK_SCALARS, false).is_ok());
    Ok(())
}
