//! Exact wire-format assertions: canonical encodings, decoding of
//! separator-less streams, malformed inputs, and the validator.

use cton::{
    cton, decode, decode_with_options, encode, validate, CtonMap, DecimalMode, DecodeOptions,
    EncodeOptions, ParseError, Value,
};

fn enc(value: &Value) -> String {
    encode(value, &EncodeOptions::default()).unwrap()
}

#[test]
fn hikes_document_encodes_canonically() {
    let value = cton!({
        "context": {
            "task": "Our favorite hikes together",
            "location": "Boulder",
            "season": "spring_2025"
        },
        "friends": ["ana", "luis", "sam"],
        "hikes": [
            {
                "id": 1,
                "name": "Blue Lake Trail",
                "distanceKm": 7.5,
                "elevationGain": 320,
                "companion": "ana",
                "wasSunny": true
            },
            {
                "id": 2,
                "name": "Ridge Overlook",
                "distanceKm": 9.2,
                "elevationGain": 540,
                "companion": "luis",
                "wasSunny": false
            },
            {
                "id": 3,
                "name": "Wildflower Loop",
                "distanceKm": 5.1,
                "elevationGain": 180,
                "companion": "sam",
                "wasSunny": true
            }
        ]
    });

    let expected = "context(task=\"Our favorite hikes together\",location=Boulder,season=spring_2025)\n\
         friends[3]=ana,luis,sam\n\
         hikes[3]{id,name,distanceKm,elevationGain,companion,wasSunny}=\
         1,\"Blue Lake Trail\",7.5,320,ana,true;\
         2,\"Ridge Overlook\",9.2,540,luis,false;\
         3,\"Wildflower Loop\",5.1,180,sam,true";
    assert_eq!(enc(&value), expected);

    // Decoding reproduces the tree, and re-encoding the decoded tree
    // reproduces the bytes.
    let decoded = decode(expected).unwrap();
    assert_eq!(decoded, value);
    assert_eq!(enc(&decoded), expected);
}

#[test]
fn numbers_normalize() {
    let value = cton!({
        "intish": 1.0,
        "fraction": 0.5,
        "scientific": 1.2e6,
        "negative_zero": (-0.0)
    });
    assert_eq!(
        enc(&value),
        "intish=1\nfraction=0.5\nscientific=1200000\nnegative_zero=0"
    );
}

#[test]
fn non_finite_floats_become_null() {
    let value = cton!({
        "pos_inf": (f64::INFINITY),
        "neg_inf": (f64::NEG_INFINITY),
        "not_a_number": (f64::NAN)
    });
    assert_eq!(enc(&value), "pos_inf=null\nneg_inf=null\nnot_a_number=null");

    // They come back as Null, never as a decimal.
    let decoded = decode(&enc(&value)).unwrap();
    assert_eq!(decoded.get("pos_inf"), Some(&Value::Null));
    assert_eq!(decoded.get("not_a_number"), Some(&Value::Null));
}

#[test]
fn lookalike_strings_are_quoted() {
    let value = cton!({
        "bool_string": "true",
        "numeric_string": "007",
        "float_like": "1e6",
        "negative_digits": "-5"
    });
    assert_eq!(
        enc(&value),
        "bool_string=\"true\"\nnumeric_string=\"007\"\nfloat_like=\"1e6\"\nnegative_digits=\"-5\""
    );

    // And they come back as the same strings.
    let decoded = decode(&enc(&value)).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn separator_less_streams_split_at_key_boundaries() {
    let decoded = decode("a=1b=2c=3").unwrap();
    assert_eq!(decoded, cton!({"a": 1, "b": 2, "c": 3}));

    let decoded = decode("k1=1k2=2k3=3").unwrap();
    assert_eq!(decoded, cton!({"k1": 1, "k2": 2, "k3": 3}));
}

#[test]
fn empty_separator_round_trips_numeric_payloads() {
    let value = cton!({"a": 1, "b": 2.5, "c": {"d": true}, "e": [2, 3]});
    let options = EncodeOptions::new().with_separator("");
    let packed = encode(&value, &options).unwrap();
    assert_eq!(packed, "a=1b=2.5c(d=true)e[2]=2,3");
    assert_eq!(decode(&packed).unwrap(), value);
}

#[test]
fn empty_separator_ambiguity_is_resolved_at_the_first_boundary() {
    // `b=twoc(` could split as t/woc, two/c, or tw/oc. The first
    // qualifying boundary wins, deterministically: the scalar keeps one
    // character and `woc` becomes the next key. Writers who pack
    // alphabetic payloads with an empty separator accept this.
    let decoded = decode("b=twoc(d=1)").unwrap();
    let obj = decoded.as_object().unwrap();
    assert_eq!(obj.get("b"), Some(&Value::String("t".to_string())));
    assert!(obj.get("woc").is_some());
}

#[test]
fn malformed_inputs_are_parse_errors() {
    // Length mismatch.
    let err = decode("friends[2]=ana").unwrap_err();
    assert!(err.to_string().contains("2 elements"), "{err}");

    // Table row missing columns.
    let err = decode("rows[1]{id,name}=42").unwrap_err();
    assert!(err.to_string().contains("columns"), "{err}");

    // Unterminated string.
    let err = decode("note=\"unclosed").unwrap_err();
    assert!(err.to_string().contains("unterminated"), "{err}");

    // Unsupported escape.
    let err = decode("note=\"bad\\qescape\"").unwrap_err();
    assert!(err.to_string().contains("escape"), "{err}");

    // Trailing data.
    let err = decode("42 43").unwrap_err();
    assert!(err.to_string().contains("trailing"), "{err}");

    // Missing '=' after array length.
    let err = decode("xs[2]1,2").unwrap_err();
    assert!(err.to_string().contains("expected '='"), "{err}");
}

#[test]
fn parse_errors_carry_position_and_excerpt() {
    let err = decode("ok=1\nbroken=\"unclosed").unwrap_err();
    match err {
        ParseError::Syntax {
            line,
            column,
            excerpt,
            ..
        } => {
            assert_eq!(line, 2);
            assert!(column > 1);
            assert!(excerpt.contains("broken"), "{excerpt}");
        }
        other => panic!("expected syntax error, got {other}"),
    }
}

#[test]
fn empty_containers() {
    assert_eq!(enc(&cton!({"empty_obj": {}})), "empty_obj()");
    assert_eq!(enc(&cton!({"empty_arr": []})), "empty_arr[0]=");

    // The empty root object is the empty document.
    assert_eq!(enc(&cton!({})), "");
    assert_eq!(decode("").unwrap(), Value::Object(CtonMap::new()));

    // And both nested forms decode back.
    let decoded = decode("empty_obj()\nempty_arr[0]=").unwrap();
    assert_eq!(decoded, cton!({"empty_obj": {}, "empty_arr": []}));
}

#[test]
fn standalone_values() {
    assert_eq!(enc(&cton!(42)), "42");
    assert_eq!(decode("42").unwrap(), Value::Integer(42));
    assert_eq!(decode("true").unwrap(), Value::Bool(true));
    assert_eq!(decode("null").unwrap(), Value::Null);
    assert_eq!(
        decode("\"a quoted string\"").unwrap(),
        Value::String("a quoted string".to_string())
    );

    let arr = cton!([1, "two", true]);
    assert_eq!(enc(&arr), "[3]=1,two,true");
    assert_eq!(decode("[3]=1,two,true").unwrap(), arr);
}

#[test]
fn nested_arrays_and_objects_in_list_form() {
    let value = cton!({"mixed": [1, {"a": 2}, [2, 3]]});
    let text = enc(&value);
    assert_eq!(text, "mixed[3]=1,(a=2),[2]=2,3");
    assert_eq!(decode(&text).unwrap(), value);
}

#[test]
fn zero_padded_tokens_stay_strings() {
    let decoded = decode("code=007").unwrap();
    assert_eq!(decoded.get("code"), Some(&Value::String("007".to_string())));

    // Round trip quotes it, since the encoder sees a number lookalike.
    assert_eq!(enc(&decoded), "code=\"007\"");
}

#[test]
fn big_integers_widen_and_round_trip() {
    let digits = "123456789012345678901234567890";
    let decoded = decode(&format!("big={digits}")).unwrap();
    match decoded.get("big") {
        Some(Value::BigInt(n)) => assert_eq!(n.to_string(), digits),
        other => panic!("expected BigInt, got {other:?}"),
    }
    assert_eq!(enc(&decoded), format!("big={digits}"));
}

#[test]
fn huge_decimal_tokens_stay_strings() {
    // 1e999 overflows f64; smuggling infinity into the tree is not an
    // option, so the token survives as a string.
    let decoded = decode("x=1e999").unwrap();
    assert_eq!(decoded.get("x"), Some(&Value::String("1e999".to_string())));
}

#[test]
fn comments_are_emitted_and_discarded() {
    let value = cton!({"hikes": [1, 2], "season": "spring"});
    let options = EncodeOptions::new()
        .with_comment("hikes", "sorted by date\nids only")
        .with_comment("season", "northern hemisphere");
    let text = encode(&value, &options).unwrap();
    assert_eq!(
        text,
        "# sorted by date\n# ids only\nhikes[2]=1,2\n# northern hemisphere\nseason=spring"
    );

    // Comments are cosmetic: decoding drops them.
    assert_eq!(decode(&text).unwrap(), value);
}

#[test]
fn comments_parse_anywhere_whitespace_does() {
    let text = "# leading\na=1\n# between\nb=(\n# inside\nc=2\n)\n# trailing";
    let decoded = decode(text).unwrap();
    assert_eq!(decoded, cton!({"a": 1, "b": {"c": 2}}));
}

#[test]
fn pretty_output_reparses() {
    let value = cton!({"user": {"name": "Ada", "langs": ["rust", "lisp"], "meta": {"active": true}}});
    let options = EncodeOptions::pretty();
    let text = encode(&value, &options).unwrap();
    assert_eq!(
        text,
        "user(\n  name=Ada,\n  langs[2]=rust,lisp,\n  meta(\n    active=true\n  )\n)"
    );
    assert_eq!(decode(&text).unwrap(), value);
}

#[test]
fn precise_mode_expands_the_stored_float() {
    let options = EncodeOptions::new().with_decimal_mode(DecimalMode::Precise);
    let text = encode(&cton!({"x": 0.1}), &options).unwrap();
    assert!(text.starts_with("x=0.1000000000000000055511151231257827"));

    // The expansion is exact, so it decodes to the identical float.
    let decoded = decode(&text).unwrap();
    assert_eq!(decoded.get("x"), Some(&Value::Decimal(0.1)));
}

#[test]
fn key_order_is_preserved_not_sorted() {
    let text = "zeta=1\nalpha=2\nmid=3";
    let decoded = decode(text).unwrap();
    let keys: Vec<_> = decoded.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    assert_eq!(enc(&decoded), text);
}

#[test]
fn duplicate_keys_keep_position_later_value_wins() {
    let decoded = decode("a=1\nb=2\na=3").unwrap();
    let obj = decoded.as_object().unwrap();
    assert_eq!(obj.get("a"), Some(&Value::Integer(3)));
    let keys: Vec<_> = obj.keys().cloned().collect();
    assert_eq!(keys, vec!["a", "b"]);
}

#[test]
fn symbolized_keys_decode_identically() {
    let text = "rows[2]{id,name}=1,a;2,b\nother=1";
    let plain = decode(text).unwrap();
    let interned =
        decode_with_options(text, &DecodeOptions::new().with_symbolized_keys()).unwrap();
    assert_eq!(plain, interned);
}

#[test]
fn table_final_scalar_respects_following_pair() {
    // Empty separator after a table: the last cell must stop where the
    // next key starts.
    let value = cton!({"rows": [{"x": "y"}], "b": 1});
    let packed = encode(&value, &EncodeOptions::new().with_separator("")).unwrap();
    assert_eq!(packed, "rows[1]{x}=yb=1");
    assert_eq!(decode(&packed).unwrap(), value);
}

#[test]
fn dates_project_to_quoted_strings() {
    use chrono::{DateTime, Utc};

    let dt: DateTime<Utc> = DateTime::parse_from_rfc3339("2024-01-15T10:30:00Z")
        .unwrap()
        .with_timezone(&Utc);
    let mut map = CtonMap::new();
    map.insert("created".to_string(), Value::Date(dt));
    map.insert("n".to_string(), Value::Integer(1));
    let value = Value::Object(map);

    let text = enc(&value);
    assert_eq!(text, "created=\"2024-01-15T10:30:00+00:00\"\nn=1");

    // Decoding returns the closed variants only: the date comes back as a
    // plain string for the caller to reconstruct.
    let decoded = decode(&text).unwrap();
    assert_eq!(
        decoded.get("created"),
        Some(&Value::String("2024-01-15T10:30:00+00:00".to_string()))
    );
}

#[test]
fn dates_are_table_cells() {
    use chrono::{DateTime, Utc};

    let dt: DateTime<Utc> = DateTime::parse_from_rfc3339("2025-03-01T08:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    let mut row = CtonMap::new();
    row.insert("id".to_string(), Value::Integer(1));
    row.insert("at".to_string(), Value::Date(dt));
    let value = Value::Array(vec![Value::Object(row)]);

    assert_eq!(
        enc(&value),
        "[1]{id,at}=1,\"2025-03-01T08:00:00+00:00\""
    );
}

#[test]
fn unicode_strings_round_trip() {
    let value = cton!({"greeting": "héllo wörld 👋", "safe": "plain"});
    let text = enc(&value);
    assert_eq!(text, "greeting=\"héllo wörld 👋\"\nsafe=plain");
    assert_eq!(decode(&text).unwrap(), value);
}

#[test]
fn escapes_cover_exactly_the_five() {
    let value = cton!({"s": "a\"b\\c\nd\re\tf"});
    let text = enc(&value);
    assert_eq!(text, "s=\"a\\\"b\\\\c\\nd\\re\\tf\"");
    assert_eq!(decode(&text).unwrap(), value);
}

#[test]
fn whitespace_is_lenient_between_tokens() {
    let decoded = decode("a = 1\nobj ( b = 2 , c = ok )\narr [2] = 1 , 2").unwrap();
    assert_eq!(decoded, cton!({"a": 1, "obj": {"b": 2, "c": "ok"}, "arr": [1, 2]}));
}

#[test]
fn validator_agrees_with_the_decoder() {
    for input in [
        "a=1\nb=hello",
        "rows[2]{id,name}=1,a;2,b",
        "x(y[0]=,z(deep=true))",
        "",
        "42",
    ] {
        assert!(decode(input).is_ok());
        assert!(validate(input).is_empty(), "{input:?}");
    }

    for input in ["friends[2]=ana", "note=\"unclosed", "a=1\nb=]"] {
        assert!(decode(input).is_err());
        assert!(!validate(input).is_empty(), "{input:?}");
    }
}

#[test]
fn validator_reports_several_problems_at_once() {
    let errors = validate("a=]\nrows[3]{x}=1;2\nz=\"open");
    assert!(errors.len() >= 2, "{errors:?}");
    // Findings arrive in source order.
    assert!(errors.windows(2).all(|w| w[0].line <= w[1].line));
}
