use strictjson::Value;
use test_case::test_case;

#[test_case("0", "0" ; "zero")]
#[test_case("[]", "[]" ; "empty array")]
#[test_case("{}", "{}" ; "empty object")]
#[test_case("0.1", "0.1" ; "fraction")]
#[test_case("\"\"", "\"\"" ; "empty string")]
#[test_case("null", "null" ; "null")]
#[test_case("true", "true" ; "bool true")]
#[test_case("false", "false" ; "bool false")]
// valid utf16 escapes
#[test_case(" [\"\\u0020\"] ", "[\" \"]" ; "escaped space becomes literal")]
#[test_case(" [\"\\u00A0\"] ", "[\"\\u00a0\"]" ; "nbsp re escapes lowercase")]
// invalid utf16 escape sequences are echoed as literal text
#[test_case("[\"\\uDFAA\"]", "[\"\\\\uDFAA\"]" ; "lone low surrogate")]
#[test_case(" [\"\\uDd1e\\uD834\"] ", "[\"\\\\uDd1e\\\\uD834\"]" ; "pair in wrong order")]
#[test_case(" [\"\\ud800abc\"] ", "[\"\\\\ud800abc\"]" ; "high surrogate then text")]
#[test_case(" [\"\\ud800\"] ", "[\"\\\\ud800\"]" ; "lone high surrogate")]
#[test_case(" [\"\\uD800\\uD800\\n\"] ", "[\"\\\\uD800\\\\uD800\\n\"]" ; "two high surrogates")]
#[test_case(" [\"\\uDd1ea\"] ", "[\"\\\\uDd1ea\"]" ; "low surrogate then letter")]
#[test_case(" [\"\\uD800\\n\"] ", "[\"\\\\uD800\\n\"]" ; "high surrogate then escape")]
// surrogate pairs merge into supplementary codepoints
#[test_case(" [\"\\ud83d\\ude00\"] ", "[\"\\ud83d\\ude00\"]" ; "valid pair survives")]
// underflow and overflow
#[test_case(" [123.456e-789] ", "[0]" ; "underflow to zero")]
#[test_case(
    " [0.4e00669999999999999999999999999999999999999999999999999999999999999999999999999999999999999999999999999999999999999969999999006] ",
    "[1e5000]"
    ; "huge exponent overflows"
)]
#[test_case(" [1.5e+9999] ", "[1e5000]" ; "positive overflow")]
#[test_case(" [-1.5e+9999] ", "[-1e5000]" ; "negative overflow")]
#[test_case(" [-123123123123123123123123123123] ", "[-1.2312312312312312e+29]" ; "big int falls back to double")]
fn round_trip(before: &str, after: &str) {
    let value = Value::parse(before.as_bytes())
        .unwrap_or_else(|status| panic!("parse({before:?}) failed with {status}"));
    assert_eq!(value.to_string(), after);
}

#[test]
fn serializer_output_reparses_equal() {
    let inputs = [
        r#"{"content":[[[0,10,20,3.14,40]]]}"#,
        r#"{"a":1,"b":[2,3],"c":{"d":"e"}}"#,
        r#"[null,true,false,0,-1,0.5,"x"]"#,
        "[\"\\ud83d\\ude00\",\"\\u00a0\"]",
    ];
    for input in inputs {
        let value = Value::parse(input.as_bytes()).unwrap();
        let text = value.to_string();
        let reparsed = Value::parse(text.as_bytes()).unwrap();
        assert_eq!(value, reparsed, "round trip changed {input}");
        assert_eq!(reparsed.to_string(), text, "second trip not a fixed point");
    }
}

#[test]
fn pretty_output_reparses_equal() {
    let value = Value::parse(br#"{"a":{"p":1,"q":[1,2]},"b":[{"x":true},null]}"#).unwrap();
    let pretty = value.to_string_pretty();
    assert_eq!(Value::parse(pretty.as_bytes()).unwrap(), value);
}

/// Differential check against serde_json: whatever the serializer emits must
/// be valid JSON with the same shape.
#[test]
fn output_is_valid_json_for_serde() {
    let inputs = [
        r#"{"store":{"book":[{"price":8.95},{"price":12.99}],"open":true}}"#,
        r#"[0,1,2.5,-3,"text",null]"#,
        " [\"\\u00A0\"] ",
    ];
    for input in inputs {
        let ours = Value::parse(input.as_bytes()).unwrap().to_string();
        let from_ours: serde_json::Value = serde_json::from_str(&ours).expect("emitted invalid JSON");
        let from_input: serde_json::Value = serde_json::from_str(input).unwrap();
        assert_eq!(from_ours, from_input, "shape changed for {input}");
    }
}

#[test]
fn builder_round_trip() {
    let mut object = Value::Null;
    object["content"] = Value::from("hello");
    assert_eq!(object.to_string(), r#"{"content":"hello"}"#);

    let mut inner = Value::Null;
    inner[0] = Value::from(0);
    inner[1] = Value::from(10);
    inner[2] = Value::from(20);
    inner[3] = Value::from(3.14);
    inner[4] = Value::from(40);
    let mut nested = Value::Null;
    nested[0] = inner.take();
    let mut outer = Value::Null;
    outer[0] = nested.take();
    let mut deep = Value::Null;
    deep["content"] = outer.take();
    assert_eq!(deep.to_string(), r#"{"content":[[[0,10,20,3.14,40]]]}"#);
}
