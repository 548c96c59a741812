use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use num_bigint::BigInt;
use sigma::{
    from_str, sigma, to_string, to_string_with_options, to_writer, Bytes, Error, Number,
    OffsetTime, SigmaMap, ToValue, Value, Writer, WriterOptions,
};
use std::collections::{BTreeMap, HashMap};

fn write<T: ToValue + ?Sized>(value: &T) -> String {
    to_string(value).unwrap()
}

fn write_base64<T: ToValue + ?Sized>(value: &T) -> String {
    to_string_with_options(value, WriterOptions::base64()).unwrap()
}

#[test]
fn test_base64() {
    assert_eq!(write_base64(&Bytes::new()), "*");
    assert_eq!(
        write_base64(&Bytes(b"The quick brown fox".to_vec())),
        "*VGhlIHF1aWNrIGJyb3duIGZveA"
    );
}

#[test]
fn test_binary() {
    assert_eq!(write(&Bytes(vec![0x61, 0x62, 0x63])), "|3|abc");
    assert_eq!(write(&Bytes::new()), "|0|");
}

#[test]
fn test_write_with_overrides_options() {
    let value = Value::List(vec![Value::Binary(b"ab".to_vec())]);
    let mut writer = Writer::new(Vec::new());
    writer.write_with(&value, false).unwrap();
    writer.write(&value).unwrap();
    assert_eq!(writer.into_inner(), b"[*YWI][|2|ab]".to_vec());
}

#[test]
fn test_boolean() {
    assert_eq!(write(&false), "&f");
    assert_eq!(write(&true), "&t");
}

#[test]
fn test_dates() {
    let date = NaiveDate::from_ymd_opt(2019, 8, 21).unwrap();
    assert_eq!(write(&date), "@2019-08-21");

    let time = NaiveTime::from_hms_milli_opt(10, 23, 56, 123).unwrap();
    assert_eq!(write(&time), "@10:23:56.123");
    assert_eq!(
        write(&OffsetTime::new(time, FixedOffset::east_opt(0).unwrap())),
        "@10:23:56.123Z"
    );
    assert_eq!(
        write(&OffsetTime::new(time, FixedOffset::east_opt(11 * 3600).unwrap())),
        "@10:23:56.123+11:00"
    );
    assert_eq!(
        write(&OffsetTime::new(time, FixedOffset::west_opt(11 * 3600).unwrap())),
        "@10:23:56.123-11:00"
    );

    let local = NaiveDateTime::new(
        date,
        NaiveTime::from_hms_nano_opt(10, 11, 12, 123_456_789).unwrap(),
    );
    assert_eq!(write(&local), "@2019-08-21T10:11:12.123456789");

    let whole = NaiveDateTime::new(date, NaiveTime::from_hms_opt(10, 11, 12).unwrap());
    let plus = FixedOffset::east_opt(11 * 3600 + 1800).unwrap();
    let minus = FixedOffset::west_opt(11 * 3600 + 1800).unwrap();
    let utc = FixedOffset::east_opt(0).unwrap();
    assert_eq!(
        write(&plus.from_local_datetime(&whole).single().unwrap()),
        "@2019-08-21T10:11:12+11:30"
    );
    assert_eq!(
        write(&minus.from_local_datetime(&whole).single().unwrap()),
        "@2019-08-21T10:11:12-11:30"
    );
    assert_eq!(
        write(&utc.from_local_datetime(&whole).single().unwrap()),
        "@2019-08-21T10:11:12Z"
    );

    let zoned = chrono_tz::Australia::Hobart
        .with_ymd_and_hms(2019, 12, 21, 10, 11, 12)
        .single()
        .unwrap();
    assert_eq!(write(&zoned), "@2019-12-21T10:11:12+11:00[Australia/Hobart]");
}

#[test]
fn test_seconds_always_written() {
    let midnight = chrono_tz::Australia::Hobart
        .with_ymd_and_hms(2020, 1, 1, 0, 0, 0)
        .single()
        .unwrap();
    assert_eq!(write(&midnight), "@2020-01-01T00:00:00+11:00[Australia/Hobart]");
    assert_eq!(write(&NaiveTime::from_hms_opt(8, 0, 0).unwrap()), "@08:00:00");
}

#[test]
fn test_zoned_mean_time_offset_written_to_the_minute() {
    // Hobart kept local mean time, +09:49:16, until 1895
    let hobart = chrono_tz::Australia::Hobart
        .with_ymd_and_hms(1890, 1, 1, 0, 0, 0)
        .single()
        .unwrap();
    let text = write(&hobart);
    assert_eq!(text, "@1890-01-01T00:00:00+09:49[Australia/Hobart]");
    let back: chrono::DateTime<chrono_tz::Tz> = from_str(&text).unwrap().unwrap();
    assert_eq!(back, hobart);

    let read: Value = from_str("@1890-01-01T00:00:00+10:00[Australia/Hobart]")
        .unwrap()
        .unwrap();
    let rewritten = write(&read);
    assert_eq!(rewritten, text);
    assert_eq!(from_str::<Value>(&rewritten).unwrap(), Some(read));
}

#[test]
fn test_unwritable_temporals_fail() {
    let far = NaiveDate::from_ymd_opt(12345, 1, 1).unwrap();
    let err = to_string(&far).unwrap_err();
    assert!(matches!(err, Error::Encoding { .. }), "unexpected error: {:?}", err);
    assert!(err.to_string().contains("year outside 0000..=9999"));

    let leap = NaiveTime::from_hms_nano_opt(23, 59, 59, 1_500_000_000).unwrap();
    let err = to_string(&leap).unwrap_err();
    assert!(err.to_string().contains("leap second"));

    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
    let odd = FixedOffset::east_opt(3601).unwrap();
    let err = to_string(&OffsetTime::new(noon, odd)).unwrap_err();
    assert!(err.to_string().contains("whole number of minutes"));
    let local = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap().and_time(noon);
    let err = to_string(&odd.from_local_datetime(&local).single().unwrap()).unwrap_err();
    assert!(matches!(err, Error::Encoding { .. }));

    // position is the byte at which the value would have started
    let list = vec![Value::from(1), Value::from(far)];
    let err = to_string(&list).unwrap_err();
    assert_eq!(err.position(), Some(3));
}

#[test]
fn test_sink_failure_is_io_error() {
    let mut buf = [0u8; 2];
    let mut writer = Writer::new(&mut buf[..]);
    let err = writer.write(&Value::from("too long")).unwrap_err();
    assert!(matches!(err, Error::Io(_)), "unexpected error: {:?}", err);
    assert_eq!(err.position(), None);
}

#[test]
fn test_list() {
    let mut list: Vec<Value> = Vec::new();
    assert_eq!(write(&list), "[]");
    list.push(Value::from(123));
    assert_eq!(write(&list), "[123]");
    list.push(Value::from("test"));
    assert_eq!(write(&list), r#"[123,"test"]"#);
    list.push(Value::List(Vec::new()));
    assert_eq!(write(&list), r#"[123,"test",[]]"#);
}

#[test]
fn test_map() {
    let mut map: BTreeMap<String, Value> = BTreeMap::new();
    assert_eq!(write(&map), "{}");
    map.insert("a".into(), Value::from(123));
    assert_eq!(write(&map), r#"{"a"=123}"#);
    map.insert("b".into(), Value::from("test"));
    assert_eq!(write(&map), r#"{"a"=123,"b"="test"}"#);
    map.insert("c d".into(), Value::Bool(false));
    assert_eq!(write(&map), r#"{"a"=123,"b"="test","c d"=&f}"#);
    map.insert("e=f".into(), Value::Null);
    assert_eq!(write(&map), r#"{"a"=123,"b"="test","c d"=&f,"e=f"=&n}"#);

    let mut mixed = SigmaMap::new();
    mixed.insert(Value::from(1), Value::from(2));
    mixed.insert(Value::from("3"), Value::from(4));
    assert_eq!(write(&mixed), r#"{1=2,"3"=4}"#);

    let mut hashed: HashMap<i32, i32> = HashMap::new();
    hashed.insert(7, 49);
    assert_eq!(write(&hashed), "{7=49}");
}

#[test]
fn test_null() {
    assert_eq!(write(&Value::Null), "&n");
    assert_eq!(write(&None::<i32>), "&n");
}

#[test]
fn test_numbers() {
    assert_eq!(write(&0), "0");
    assert_eq!(write(&3i8), "3");
    assert_eq!(write(&4i16), "4");
    assert_eq!(write(&123_456_789_123i64), "123456789123");
    assert_eq!(write(&1.234f32), "1.234");
    assert_eq!(write(&1.234f64), "1.234");
    assert_eq!(write(&u128::MAX), "340282366920938463463374607431768211455");

    let big: Number = "1.23468273648723676e5867".parse().unwrap();
    assert_eq!(write(&big), "1.23468273648723676E+5867");
    let int: BigInt = "1234682736487236765867".parse().unwrap();
    assert_eq!(write(&int), "1234682736487236765867");
    assert_eq!(write(&Value::Number("0.000001".parse().unwrap())), "0.000001");
    assert_eq!(write(&Value::Number("0.0000001".parse().unwrap())), "1E-7");
}

#[test]
fn test_non_finite_floats_fail() {
    assert!(to_string(&f64::NAN).is_err());
    assert!(to_string(&f32::INFINITY).is_err());
}

#[test]
fn test_string() {
    assert_eq!(write(""), r#""""#);
    assert_eq!(write("test"), r#""test""#);
    assert_eq!(write("a\"b"), r#""a\"b""#);
    assert_eq!(write("\\\""), r#""\\\"""#);
    assert_eq!(write("\r\n\t"), r#""\r\n\t""#);
    assert_eq!(write("\u{0}"), r#""\u0000""#);
    assert_eq!(write("\u{1}"), r#""\u0001""#);
    assert_eq!(write("\u{1f}"), r#""\u001F""#);
    assert_eq!(write("\u{61}"), r#""a""#);
    assert_eq!(write("\u{7f}"), "\"\u{7f}\"");
}

fn utf8_code_points(start: u32, end: u32) {
    let s: String = (start..=end).filter_map(char::from_u32).collect();
    assert_eq!(write(s.as_str()), format!("\"{}\"", s));
}

#[test]
fn test_utf8_code_points() {
    utf8_code_points(0x7F, 0x7FF);
    utf8_code_points(0x800, 0x9FF);
    utf8_code_points(0xE000, 0xE0FF);
    utf8_code_points(0x10000, 0x100FF);
}

#[test]
fn test_macro_values() {
    let value = sigma!({
        "id" => 7,
        "tags" => ["x", "y"],
        "blob" => (Bytes(vec![1])),
        "none" => null
    });
    let mut out = Vec::new();
    to_writer(&mut out, &value).unwrap();
    assert_eq!(out, b"{\"id\"=7,\"tags\"=[\"x\",\"y\"],\"blob\"=|1|\x01,\"none\"=&n}".to_vec());
}
