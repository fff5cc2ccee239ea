use super::*;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_new_table_has_base_unit() {
    let table = UnitTable::new();
    let unit = table.lookup("m/s").expect("base unit must exist");
    assert_eq!(unit.factor, 1.0);
    assert_eq!(table.len(), 1);
}

#[test]
fn test_parse_registers_units() {
    let table = UnitTable::parse("km/h 0.277778\nmph 0.44704\n");
    assert_eq!(table.lookup("km/h").unwrap().factor, 0.277778);
    assert_eq!(table.lookup("mph").unwrap().factor, 0.44704);
    assert!(table.lookup("m/s").is_some());
    assert_eq!(table.len(), 3);
}

#[test]
fn test_parse_strips_comments_and_blank_lines() {
    let source = "\
# speed units
km/h 0.277778 # kilometers per hour

   \t
# knots 0.514444
";
    let table = UnitTable::parse(source);
    assert!(table.lookup("km/h").is_some());
    assert!(table.lookup("knots").is_none());
    assert_eq!(table.len(), 2);
}

#[test]
fn test_parse_skips_malformed_entries() {
    let source = "\
lonely
bad abc
zero 0
negative -3.5
nan NaN
ok 2.5 extra tokens
";
    let table = UnitTable::parse(source);
    assert!(table.lookup("lonely").is_none());
    assert!(table.lookup("bad").is_none());
    assert!(table.lookup("zero").is_none());
    assert!(table.lookup("negative").is_none());
    assert!(table.lookup("nan").is_none());
    assert_eq!(table.lookup("ok").unwrap().factor, 2.5);
}

#[test]
fn test_parse_may_override_base_unit() {
    let table = UnitTable::parse("m/s 2");
    assert_eq!(table.base().factor, 2.0);
    assert_eq!(table.lookup("m/s").unwrap().factor, 2.0);
}

#[test]
fn test_lookup_is_case_sensitive() {
    let table = UnitTable::parse("km/h 0.277778");
    assert!(table.lookup("KM/H").is_none());
}

#[test]
fn test_load_missing_file_falls_back_to_base_unit() {
    let dir = tempfile::tempdir().unwrap();
    let table = UnitTable::load_file(&dir.path().join("units")).unwrap();
    assert!(table.lookup("m/s").is_some());
    assert!(table.lookup("anything-else").is_none());
}

#[test]
fn test_load_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "km/h 0.277778").unwrap();
    writeln!(file, "# comment only").unwrap();

    let table = UnitTable::load_file(file.path()).unwrap();
    assert!(table.lookup("km/h").is_some());
    assert_eq!(table.names(), vec!["km/h".to_string(), "m/s".to_string()]);
}

#[test]
fn test_round_half_away_from_zero() {
    assert_eq!(round_to_decimals(2.345, 2), 2.35);
    assert_eq!(round_to_decimals(-2.345, 2), -2.35);
    assert_eq!(round_to_decimals(1.004, 2), 1.0);
}

#[test]
fn test_round_to_zero_decimals_is_integral() {
    let rounded = round_to_decimals(7.5, 0);
    assert_eq!(rounded, 8.0);
    assert_eq!(rounded.fract(), 0.0);
    assert_eq!(round_to_decimals(-7.5, 0), -8.0);
}

#[test]
fn test_convert_formats_value_and_name() {
    let kmh = Unit::new("km/h", 0.277778);
    assert_eq!(kmh.convert(5.0), "18.0 km/h");

    let base = Unit::base();
    assert_eq!(base.convert(2.345), "2.35 m/s");
    assert_eq!(base.convert(0.0), "0.0 m/s");
}

#[test]
fn test_convert_scaled_by_factor() {
    let unit = Unit::new("knots", 0.514444);
    let x = 12.3456;
    assert_eq!(unit.convert(unit.factor * x), "12.35 knots");
}
