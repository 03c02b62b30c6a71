//! Integration tests for durability across close/reopen.

use std::fs::metadata;
use tempfile::{NamedTempFile, TempDir};

use arrayfile::{ArrayFile, ArrayFileError, ArrayOptions, HEADER_SIZE, OpenMode, inspect};

#[test]
fn appended_values_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("roundtrip.ary");
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    let values: Vec<i64> = (0..2_500).map(|_| rng.i64(..)).collect();

    {
        let array = ArrayFile::<i64>::create(&path).unwrap();
        for value in &values {
            array.append(*value).unwrap();
        }
        array.close().unwrap();
    }

    let array = ArrayFile::<i64>::open(&path).unwrap();
    assert_eq!(array.len(), values.len());
    assert_eq!(array.to_vec().unwrap(), values);
    let iterated: Vec<i64> = array.iter().map(Result::unwrap).collect();
    assert_eq!(iterated, values);
}

#[test]
fn reopen_reports_length_not_preallocated_capacity() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prealloc.ary");

    {
        let options = ArrayOptions::builder()
            .mode(OpenMode::Create)
            .initial_capacity(1000)
            .build();
        let array = ArrayFile::<i32>::open_with(&path, options).unwrap();
        assert!(array.capacity() >= 1000);
        array.extend([10, 20, 30]).unwrap();
        array.close().unwrap();
    }

    let array = ArrayFile::<i32>::open(&path).unwrap();
    assert_eq!(array.len(), 3);
    assert_eq!(array.to_vec().unwrap(), vec![10, 20, 30]);
    array.close().unwrap();

    let err = ArrayFile::<f64>::open(&path).unwrap_err();
    assert!(err.is_incompatible());
    let message = err.to_string();
    assert!(message.contains("'i'"), "missing file encoding: {message}");
    assert!(message.contains("'d'"), "missing requested encoding: {message}");
}

#[test]
fn close_truncates_to_exact_data_size() {
    let temp = NamedTempFile::new().unwrap();
    let path = temp.path();

    let array = ArrayFile::<u32>::create(path).unwrap();
    array.extend(0..10u32).unwrap();
    assert_eq!(metadata(path).unwrap().len() % 4096, 0);

    array.close().unwrap();
    assert_eq!(metadata(path).unwrap().len(), (HEADER_SIZE + 10 * 4) as u64);
    assert_eq!(inspect(path).unwrap().length, 10);
}

#[test]
fn close_is_idempotent() {
    let temp = NamedTempFile::new().unwrap();
    let path = temp.path();

    let array = ArrayFile::<u16>::create(path).unwrap();
    array.extend([1, 2, 3]).unwrap();
    array.close().unwrap();
    let size = metadata(path).unwrap().len();
    let header = inspect(path).unwrap();

    array.close().unwrap();
    assert!(array.is_closed());
    assert_eq!(metadata(path).unwrap().len(), size);
    assert_eq!(inspect(path).unwrap(), header);
    drop(array);
    assert_eq!(metadata(path).unwrap().len(), size);
}

#[test]
fn flush_makes_writes_visible_to_a_second_reader() {
    let temp = NamedTempFile::new().unwrap();
    let path = temp.path();

    let array = ArrayFile::<u8>::create(path).unwrap();
    array.extend([0xAB, 0xCD]).unwrap();
    array.flush().unwrap();

    let raw = std::fs::read(path).unwrap();
    assert_eq!(&raw[HEADER_SIZE..HEADER_SIZE + 2], &[0xAB, 0xCD]);
    array.close().unwrap();
}

#[test]
fn flushed_length_survives_abandoned_handle() {
    let temp = NamedTempFile::new().unwrap();
    let path = temp.path();

    let array = ArrayFile::<i32>::create(path).unwrap();
    array.extend([1, 2, 3]).unwrap();
    array.flush().unwrap();
    assert_eq!(inspect(path).unwrap().length, 3);
    // never closed or dropped
    std::mem::forget(array);

    let array = ArrayFile::<i32>::open(path).unwrap();
    assert_eq!(array.len(), 3);
    assert_eq!(array.to_vec().unwrap(), vec![1, 2, 3]);
}

#[test]
fn every_builtin_encoding_persists() {
    let dir = TempDir::new().unwrap();

    fn check<T>(dir: &TempDir, name: &str, values: Vec<T>)
    where
        T: arrayfile::Element + Clone + std::fmt::Debug,
    {
        let path = dir.path().join(name);
        {
            let array = ArrayFile::<T>::create(&path).unwrap();
            array.extend(values.clone()).unwrap();
            array.close().unwrap();
        }
        let array = ArrayFile::<T>::open(&path).unwrap();
        assert_eq!(array.to_vec().unwrap(), values, "{name}");
        let header = inspect(&path).unwrap();
        assert_eq!(header.encoding, T::descriptor(), "{name}");
        assert_eq!(header.element_size as usize, T::SIZE, "{name}");
    }

    check(&dir, "b.ary", vec![i8::MIN, -1, 0, i8::MAX]);
    check(&dir, "ub.ary", vec![0u8, 255]);
    check(&dir, "bool.ary", vec![true, false, true]);
    check(&dir, "h.ary", vec![-300i16, 300]);
    check(&dir, "uh.ary", vec![65535u16]);
    check(&dir, "i.ary", vec![i32::MIN, 42]);
    check(&dir, "ui.ary", vec![u32::MAX]);
    check(&dir, "q.ary", vec![i64::MIN, i64::MAX]);
    check(&dir, "uq.ary", vec![u64::MAX, 0]);
    check(&dir, "f.ary", vec![1.25f32, -0.5]);
    check(&dir, "d.ary", vec![std::f64::consts::PI, -1e300]);
    check(&dir, "s.ary", vec![*b"abcdefgh", *b"12345678"]);
}

#[test]
fn open_mode_create_discards_existing_contents() {
    let temp = NamedTempFile::new().unwrap();
    let path = temp.path();
    {
        let array = ArrayFile::<i32>::create(path).unwrap();
        array.extend([1, 2, 3]).unwrap();
    }
    let array = ArrayFile::<i32>::create(path).unwrap();
    assert!(array.is_empty());
}

#[test]
fn cleared_file_reopens_empty() {
    let temp = NamedTempFile::new().unwrap();
    let path = temp.path();
    {
        let array = ArrayFile::<i32>::create(path).unwrap();
        array.extend([1, 2, 3]).unwrap();
        array.clear().unwrap();
        // no close: the header was already rewritten by clear
        std::mem::forget(array);
    }
    assert_eq!(metadata(path).unwrap().len(), HEADER_SIZE as u64);
    let array = ArrayFile::<i32>::open(path).unwrap();
    assert_eq!(array.len(), 0);
    array.append(4).unwrap();
    assert_eq!(array.to_vec().unwrap(), vec![4]);
}

#[test]
fn mismatched_element_type_never_reinterprets_data() {
    let temp = NamedTempFile::new().unwrap();
    let path = temp.path();
    {
        let array = ArrayFile::<u32>::create(path).unwrap();
        array.append(7).unwrap();
    }
    match ArrayFile::<i32>::open(path) {
        Err(ArrayFileError::EncodingMismatch { found, requested }) => {
            assert_eq!(found, "I");
            assert_eq!(requested, "i");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
