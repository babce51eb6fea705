use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;

fn strings(items: &[&str]) -> Vec<String> {
	items.iter().map(|s| s.to_string()).collect()
}

fn open() -> (tempfile::TempDir, FilePermissionStore) {
	let dir = tempfile::tempdir().unwrap();
	let store = FilePermissionStore::open(dir.path().join("permdata")).unwrap();
	(dir, store)
}

#[test]
fn empty_store_has_no_locations_or_default() {
	let (_dir, store) = open();
	assert_eq!(store.locations().unwrap(), None);
	assert_eq!(store.get(None).unwrap(), None);
	assert_eq!(store.get(Some("file:/a.jar")).unwrap(), None);
}

#[rstest]
#[case(None)]
#[case(Some("file:/plugins/a.jar"))]
fn set_then_get(#[case] location: Option<&str>) {
	let (_dir, store) = open();
	let data = strings(&["(java.io.FilePermission \"/tmp\" \"read\")", "(java.util.PropertyPermission \"*\" \"read\")"]);
	store.set(location, Some(data.as_slice())).unwrap();
	assert_eq!(store.get(location).unwrap(), Some(data));
}

#[test]
fn default_record_is_not_a_location() {
	let (_dir, store) = open();
	store.set(None, Some(strings(&["all"]).as_slice())).unwrap();
	assert_eq!(store.locations().unwrap(), None);
}

#[test]
fn overwrite_keeps_single_file() {
	let (_dir, store) = open();
	store.set(Some("loc"), Some(strings(&["a"]).as_slice())).unwrap();
	store.set(Some("loc"), Some(strings(&["b", "c"]).as_slice())).unwrap();

	assert_eq!(store.get(Some("loc")).unwrap(), Some(strings(&["b", "c"])));
	let records = std::fs::read_dir(store.dir()).unwrap().count();
	assert_eq!(records, 1);
}

#[test]
fn set_none_deletes_record() {
	let (_dir, store) = open();
	store.set(Some("loc"), Some(strings(&["a"]).as_slice())).unwrap();
	store.set(None, Some(strings(&["d"]).as_slice())).unwrap();

	store.set(Some("loc"), None).unwrap();
	store.set(None, None).unwrap();

	assert_eq!(store.get(Some("loc")).unwrap(), None);
	assert_eq!(store.get(None).unwrap(), None);
	assert_eq!(store.locations().unwrap(), None);
	assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 0);
}

#[test]
fn deleting_missing_record_is_a_noop() {
	let (_dir, store) = open();
	store.set(Some("never"), None).unwrap();
	store.set(None, None).unwrap();
}

#[test]
fn locations_are_sorted() {
	let (_dir, store) = open();
	for loc in ["c", "a", "b"] {
		store.set(Some(loc), Some(strings(&[loc]).as_slice())).unwrap();
	}
	assert_eq!(store.locations().unwrap(), Some(strings(&["a", "b", "c"])));
}

#[test]
fn reopen_rescans_records() {
	let dir = tempfile::tempdir().unwrap();
	let root = dir.path().join("permdata");
	{
		let store = FilePermissionStore::open(&root).unwrap();
		store.set(Some("x"), Some(strings(&["1"]).as_slice())).unwrap();
		store.set(Some("y"), Some(strings(&["2", "3"]).as_slice())).unwrap();
		store.set(None, Some(strings(&["default"]).as_slice())).unwrap();
	}

	let store = FilePermissionStore::open(&root).unwrap();
	assert_eq!(store.locations().unwrap(), Some(strings(&["x", "y"])));
	assert_eq!(store.get(Some("y")).unwrap(), Some(strings(&["2", "3"])));
	assert_eq!(store.get(None).unwrap(), Some(strings(&["default"])));
}

#[test]
fn rescan_skips_temp_and_corrupt_files() {
	let dir = tempfile::tempdir().unwrap();
	let root = dir.path().join("permdata");
	{
		let store = FilePermissionStore::open(&root).unwrap();
		store.set(Some("good"), Some(strings(&["ok"]).as_slice())).unwrap();
	}
	std::fs::write(root.join(format!("{TEMP_PREFIX}abc")), b"partial").unwrap();
	std::fs::write(root.join("perm-corrupt"), b"").unwrap();

	let store = FilePermissionStore::open(&root).unwrap();
	assert_eq!(store.locations().unwrap(), Some(strings(&["good"])));
}

#[test]
fn unsupported_version_surfaces_as_error() {
	let (_dir, store) = open();
	let bytes = postcard::to_allocvec(&(99u32, PermissionRecord {
		location: None,
		data: Vec::new(),
	}))
	.unwrap();
	std::fs::write(store.dir().join(DEFAULT_FILE), bytes).unwrap();

	let err = store.get(None).unwrap_err();
	assert!(matches!(err, StorageError::UnsupportedVersion { version: 99, .. }));
}

#[test]
fn record_file_read_failure_is_storage_error() {
	let (_dir, store) = open();
	// a directory where the default record should be
	std::fs::create_dir(store.dir().join(DEFAULT_FILE)).unwrap();
	assert!(matches!(store.get(None), Err(StorageError::Io { .. })));
}

#[test]
fn unkept_reservation_leaves_no_file() {
	let (_dir, store) = open();
	let reserved = store.reserve_record_path().unwrap();
	assert!(reserved.exists());
	drop(reserved);

	assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 0);
	let reopened = FilePermissionStore::open(store.dir()).unwrap();
	assert_eq!(reopened.locations().unwrap(), None);
}

#[test]
fn failed_write_leaves_no_temp_file() {
	let (_dir, store) = open();
	// a non-empty directory cannot be replaced by the record file
	let blocked = store.dir().join("blocked");
	std::fs::create_dir_all(blocked.join("inner")).unwrap();
	let record = PermissionRecord {
		location: Some("loc".into()),
		data: strings(&["a"]),
	};
	assert!(store.write_atomic(&blocked, &record).is_err());

	let names: Vec<_> = std::fs::read_dir(store.dir())
		.unwrap()
		.map(|e| e.unwrap().file_name())
		.collect();
	assert_eq!(names, vec![std::ffi::OsString::from("blocked")]);
}

#[test]
fn new_location_keeps_exactly_one_record_file() {
	let (_dir, store) = open();
	let path = store.write_new_record(&PermissionRecord {
		location: Some("loc".into()),
		data: strings(&["a"]),
	})
	.unwrap();

	assert!(path.file_name().unwrap().to_str().unwrap().starts_with(RECORD_PREFIX));
	assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 1);
	assert_eq!(read_record(&path).unwrap().unwrap().data, strings(&["a"]));
}
