mod test_utilities;
use rstest::rstest;
use serde_json::Value;
use test_utilities::{get_temp_output, utiles_cmd};

#[rstest]
#[case("flat")]
#[case("hash")]
#[case("norm")]
fn touch_then_info_reports_the_requested_schema(#[case] db_type: &str) -> Result<(), Box<dyn std::error::Error>> {
	let (_dir, path) = get_temp_output("tiles.mbtiles");

	utiles_cmd().args(["touch", path.to_str().unwrap(), "--db-type", db_type]).assert().success();
	assert!(path.exists());

	let assert = utiles_cmd().args(["info", path.to_str().unwrap()]).assert().success();
	let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
	let report: Value = serde_json::from_str(stdout.trim())?;
	assert_eq!(report["mbtype"], db_type);
	assert_eq!(report["ntiles"], 0);

	let assert = utiles_cmd().args(["metadata", path.to_str().unwrap()]).assert().success();
	let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
	let rows: Value = serde_json::from_str(stdout.trim())?;
	assert!(rows.as_array().is_some_and(Vec::is_empty));

	Ok(())
}

#[test]
fn cp_round_trips_tiles_between_two_mbtiles_schemas() -> Result<(), Box<dyn std::error::Error>> {
	let (_src_dir, src) = get_temp_output("src.mbtiles");
	let (_dst_dir, dst) = get_temp_output("dst.mbtiles");

	utiles_cmd().args(["touch", src.to_str().unwrap(), "--db-type", "flat"]).assert().success();

	utiles_cmd()
		.args(["cp", src.to_str().unwrap(), dst.to_str().unwrap(), "--dbtype", "hash"])
		.assert()
		.success();
	assert!(dst.exists());

	let assert = utiles_cmd().args(["info", dst.to_str().unwrap()]).assert().success();
	let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
	let report: Value = serde_json::from_str(stdout.trim())?;
	assert_eq!(report["mbtype"], "hash");
	assert_eq!(report["ntiles"], 0);

	Ok(())
}

#[test]
fn agg_hash_of_an_empty_mbtiles_file_is_stable() -> Result<(), Box<dyn std::error::Error>> {
	let (_dir, path) = get_temp_output("empty.mbtiles");
	utiles_cmd().args(["touch", path.to_str().unwrap()]).assert().success();

	let first = utiles_cmd().args(["agg-hash", path.to_str().unwrap()]).assert().success();
	let second = utiles_cmd().args(["agg-hash", path.to_str().unwrap()]).assert().success();
	assert_eq!(first.get_output().stdout, second.get_output().stdout);

	let report: Value = serde_json::from_str(String::from_utf8_lossy(&first.get_output().stdout).trim())?;
	assert_eq!(report["ntiles"], 0);

	Ok(())
}

#[test]
fn update_on_an_empty_mbtiles_file_succeeds() -> Result<(), Box<dyn std::error::Error>> {
	let (_dir, path) = get_temp_output("to_update.mbtiles");
	utiles_cmd().args(["touch", path.to_str().unwrap()]).assert().success();
	utiles_cmd().args(["update", path.to_str().unwrap()]).assert().success();
	Ok(())
}

#[test]
fn rimraf_removes_a_directory_pyramid() -> Result<(), Box<dyn std::error::Error>> {
	let dir = tempfile::tempdir()?;
	let pyramid = dir.path().join("pyramid");
	std::fs::create_dir_all(pyramid.join("0/0"))?;
	std::fs::write(pyramid.join("0/0/0.pbf"), b"not a real tile")?;

	utiles_cmd().args(["rimraf", pyramid.to_str().unwrap()]).assert().success();
	assert!(!pyramid.exists());
	Ok(())
}
