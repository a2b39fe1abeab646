use std::collections::{HashMap, HashSet};

use promptmock_core::{CompletionRequest, Temperature, TemperatureParseError};
use serde_json::json;

fn temp(s: &str) -> Temperature {
    s.parse().expect("temperature")
}

#[test]
fn temperature_parses_and_displays_single_digit_decimal() {
    let t = temp("0.7");
    assert_eq!(t.tenths(), 7);
    assert_eq!(t.to_string(), "0.7");
    assert_eq!(temp("1.0").to_string(), "1.0");
    assert!((t.as_f64() - 0.7).abs() < f64::EPSILON);
}

#[test]
fn temperature_rejects_other_shapes() {
    for bad in ["0.75", ".7", "07", "a.7", "0,7", "", "٣.٣"] {
        let err = bad.parse::<Temperature>().expect_err(bad);
        assert!(matches!(err, TemperatureParseError::Malformed(_)), "{bad}");
    }
}

#[test]
fn temperature_from_digits_requires_ascii_digits() {
    assert_eq!(Temperature::from_digits('1', '5').unwrap(), temp("1.5"));
    assert!(Temperature::from_digits('x', '5').is_err());
}

#[test]
fn temperature_from_tenths_caps_at_nine_point_nine() {
    assert_eq!(Temperature::from_tenths(99).unwrap().to_string(), "9.9");
    assert!(matches!(
        Temperature::from_tenths(100),
        Err(TemperatureParseError::OutOfRange(_))
    ));
}

#[test]
fn temperature_serializes_as_number_and_accepts_strings() {
    assert_eq!(serde_json::to_value(temp("0.7")).unwrap(), json!(0.7));

    let from_number: Temperature = serde_json::from_value(json!(0.3)).unwrap();
    let from_string: Temperature = serde_json::from_value(json!("0.3")).unwrap();
    let from_integer: Temperature = serde_json::from_value(json!(1)).unwrap();
    assert_eq!(from_number, temp("0.3"));
    assert_eq!(from_string, temp("0.3"));
    assert_eq!(from_integer, temp("1.0"));

    assert!(serde_json::from_value::<Temperature>(json!(0.75)).is_err());
}

#[test]
fn requests_with_equal_fields_are_the_same_key() {
    let a = CompletionRequest::new("Translate: hello", temp("0.7"), 64)
        .with_n(Some(2))
        .with_stop(Some("\n".to_string()));
    let b = CompletionRequest::new("Translate: hello".to_string(), temp("0.7"), 64)
        .with_n(Some(2))
        .with_stop(Some("\n".to_string()));
    let c = a.clone().with_stream(Some(true));

    assert_eq!(a, b);
    assert_ne!(a, c);

    let mut map: HashMap<CompletionRequest, Vec<&str>> = HashMap::new();
    map.entry(a).or_default().push("Bonjour");
    map.entry(b).or_default().push("Salut");
    map.entry(c).or_default().push("Hola");

    assert_eq!(map.len(), 2);
    let lengths: HashSet<_> = map.values().map(|v| v.len()).collect();
    assert_eq!(lengths, HashSet::from([1, 2]));
}

#[test]
fn request_json_omits_absent_optionals() {
    let request = CompletionRequest::new("Hi", temp("0.0"), 16).with_top_p(Some(1));
    let value = serde_json::to_value(&request).unwrap();

    assert_eq!(
        value,
        json!({ "prompt": "Hi", "temperature": 0.0, "max_tokens": 16, "top_p": 1 })
    );

    let back: CompletionRequest = serde_json::from_value(value).unwrap();
    assert_eq!(back, request);
}
