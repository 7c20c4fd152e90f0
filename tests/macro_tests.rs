use cton::{cton, decode, encode, EncodeOptions, Value};

#[test]
fn nested_macro_structures() {
    let data = cton!({
        "server": {
            "host": "localhost",
            "port": 8080,
            "tls": false
        },
        "replicas": [1, 2, 3],
        "tags": ["primary", "eu-west"]
    });

    let server = data.get("server").unwrap();
    assert_eq!(
        server.get("host"),
        Some(&Value::String("localhost".to_string()))
    );
    assert_eq!(server.get("port"), Some(&Value::Integer(8080)));
    assert_eq!(server.get("tls"), Some(&Value::Bool(false)));

    let replicas = data.get("replicas").and_then(Value::as_array).unwrap();
    assert_eq!(replicas.len(), 3);
}

#[test]
fn macro_values_encode_directly() {
    let data = cton!({
        "active": true,
        "missing": null,
        "ratio": 0.75
    });
    let text = encode(&data, &EncodeOptions::default()).unwrap();
    assert_eq!(text, "active=true\nmissing=null\nratio=0.75");
}

#[test]
fn macro_accepts_expressions() {
    let port = 9000u16;
    let name = String::from("svc");
    let data = cton!({
        "port": port,
        "name": (name.clone()),
        "double": (port as i64 * 2)
    });
    assert_eq!(data.get("port"), Some(&Value::Integer(9000)));
    assert_eq!(data.get("name"), Some(&Value::String("svc".to_string())));
    assert_eq!(data.get("double"), Some(&Value::Integer(18000)));
}

#[test]
fn macro_trees_match_decoded_trees() {
    let built = cton!({
        "rows": [
            {"id": 1, "label": "a"},
            {"id": 2, "label": "b"}
        ]
    });
    let decoded = decode("rows[2]{id,label}=1,a;2,b").unwrap();
    assert_eq!(built, decoded);
}

#[test]
fn trailing_commas_are_tolerated() {
    let arr = cton!([1, 2, 3,]);
    assert_eq!(arr.as_array().map(Vec::len), Some(3));

    let obj = cton!({
        "a": 1,
        "b": 2,
    });
    assert_eq!(obj.as_object().map(|m| m.len()), Some(2));
}
