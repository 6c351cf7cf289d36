mod common;

use common::{ip, tree, TestDb, HIGH_IP, LOW_IP};
use geoipdb::{Capability, Error, Reader, Value};
use serde_json::json;

fn london() -> Value {
    tree(json!({
        "city": {"geoname_id": 2643743, "names": {"en": "London", "de": "London"}},
        "continent": {"code": "EU", "geoname_id": 6255148, "names": {"en": "Europe"}},
        "country": {"geoname_id": 2635167, "iso_code": "GB", "names": {"en": "United Kingdom"}},
        "location": {
            "accuracy_radius": 100,
            "latitude": 51.5142,
            "longitude": -0.0931,
            "time_zone": "Europe/London"
        },
        "registered_country": {"geoname_id": 6252001, "iso_code": "US", "names": {"en": "United States"}},
        "subdivisions": [
            {"geoname_id": 6269131, "iso_code": "ENG", "names": {"en": "England"}}
        ]
    }))
}

fn city_db() -> Vec<u8> {
    TestDb::new("GeoIP2-City").low(london()).build()
}

#[test]
fn city_lookup_decodes_the_data_section() {
    let reader = Reader::open_from_bytes(city_db()).unwrap();
    let city = reader.city(ip(LOW_IP)).unwrap();

    assert_eq!(city.city.geoname_id, 2643743);
    assert_eq!(city.city.names.english, "London");
    assert_eq!(city.city.names.german, "London");
    assert_eq!(city.continent.code, "EU");
    assert_eq!(city.country.iso_code, "GB");
    assert_eq!(city.location.accuracy_radius, 100);
    assert_eq!(city.location.latitude, 51.5142);
    assert_eq!(city.location.longitude, -0.0931);
    assert_eq!(city.location.time_zone, "Europe/London");
    assert_eq!(city.registered_country.iso_code, "US");
    assert_eq!(city.subdivisions.len(), 1);
    assert_eq!(city.subdivisions[0].iso_code, "ENG");
    assert_eq!(city.postal.code, "");
    assert!(!city.traits.is_anonymous_proxy);
}

#[test]
fn lookup_value_matches_what_was_written() {
    let original = tree(json!({
        "a": {"b": [1, 2, 3]},
        "flag": true,
        "name": "x",
        "score": 0.5,
        "neg": -7
    }));
    let db = TestDb::new("GeoLite2-ASN").high(original.clone()).build();
    let reader = Reader::open_from_bytes(db).unwrap();
    assert_eq!(reader.lookup_value(ip(HIGH_IP)).unwrap(), original);
}

#[test]
fn country_database_answers_city_with_empty_city_fields() {
    let db = TestDb::new("GeoLite2-Country")
        .low(tree(json!({
            "continent": {"code": "EU"},
            "country": {"iso_code": "GB", "is_in_european_union": false}
        })))
        .build();
    let reader = Reader::open_from_bytes(db).unwrap();

    let city = reader.city(ip(LOW_IP)).unwrap();
    assert_eq!(city.country.iso_code, "GB");
    assert_eq!(city.city.geoname_id, 0);
    assert!(city.subdivisions.is_empty());

    let country = reader.country(ip(LOW_IP)).unwrap();
    assert_eq!(country.continent.code, "EU");
}

#[test]
fn asn_database_rejects_city_lookups() {
    let db = TestDb::new("GeoLite2-ASN")
        .high(tree(json!({
            "autonomous_system_number": 1221,
            "autonomous_system_organization": "Telstra Pty Ltd"
        })))
        .build();
    let reader = Reader::open_from_bytes(db).unwrap();

    let err = reader.city(ip(HIGH_IP)).unwrap_err();
    assert!(matches!(err, Error::InvalidMethod { method: "City", .. }));
    assert_eq!(
        err.to_string(),
        "geoipdb: the City method does not support the GeoLite2-ASN database"
    );

    let asn = reader.asn(ip(HIGH_IP)).unwrap();
    assert_eq!(asn.autonomous_system_number, 1221);
    assert_eq!(asn.autonomous_system_organization, "Telstra Pty Ltd");
}

#[test]
fn isp_database_answers_asn() {
    let db = TestDb::new("GeoIP2-ISP")
        .high(tree(json!({
            "autonomous_system_number": 237,
            "autonomous_system_organization": "Merit Network Inc.",
            "isp": "Merit Network",
            "organization": "Merit Network"
        })))
        .build();
    let reader = Reader::open_from_bytes(db).unwrap();

    assert_eq!(reader.asn(ip(HIGH_IP)).unwrap().autonomous_system_number, 237);
    let isp = reader.isp(ip(HIGH_IP)).unwrap();
    assert_eq!(isp.isp, "Merit Network");
    assert_eq!(isp.mobile_country_code, "");
}

#[test]
fn enterprise_database_answers_every_location_shape() {
    let db = TestDb::new("GeoIP2-Enterprise")
        .high(tree(json!({
            "city": {"confidence": 25, "geoname_id": 1880252, "names": {"en": "Singapore"}},
            "country": {"confidence": 99, "iso_code": "SG"},
            "traits": {
                "autonomous_system_number": 14671,
                "connection_type": "Cable/DSL",
                "static_ip_score": 1.5,
                "user_type": "residential"
            }
        })))
        .build();
    let reader = Reader::open_from_bytes(db).unwrap();

    let ent = reader.enterprise(ip(HIGH_IP)).unwrap();
    assert_eq!(ent.city.confidence, 25);
    assert_eq!(ent.country.confidence, 99);
    assert_eq!(ent.traits.autonomous_system_number, 14671);
    assert_eq!(ent.traits.connection_type, "Cable/DSL");
    assert_eq!(ent.traits.static_ip_score, 1.5);

    assert_eq!(reader.city(ip(HIGH_IP)).unwrap().city.geoname_id, 1880252);
    assert_eq!(reader.country(ip(HIGH_IP)).unwrap().country.iso_code, "SG");
    assert!(reader.asn(ip(HIGH_IP)).is_err());
}

#[test]
fn flat_editions_round_trip() {
    let anon = TestDb::new("GeoIP2-Anonymous-IP")
        .high(tree(json!({"is_anonymous": true, "is_tor_exit_node": true})))
        .build();
    let reader = Reader::open_from_bytes(anon).unwrap();
    let record = reader.anonymous_ip(ip(HIGH_IP)).unwrap();
    assert!(record.is_anonymous);
    assert!(record.is_tor_exit_node);
    assert!(!record.is_anonymous_vpn);

    let conn = TestDb::new("GeoIP2-Connection-Type")
        .high(tree(json!({"connection_type": "Corporate"})))
        .build();
    let reader = Reader::open_from_bytes(conn).unwrap();
    assert_eq!(
        reader.connection_type(ip(HIGH_IP)).unwrap().connection_type,
        "Corporate"
    );

    let domain = TestDb::new("GeoIP2-Domain")
        .high(tree(json!({"domain": "example.com"})))
        .build();
    let reader = Reader::open_from_bytes(domain).unwrap();
    assert_eq!(reader.domain(ip(HIGH_IP)).unwrap().domain, "example.com");
}

#[test]
fn unknown_database_type_is_rejected_at_open() {
    let db = TestDb::new("Acme-Geo-Deluxe").build();
    let err = Reader::open_from_bytes(db).unwrap_err();
    assert!(matches!(err, Error::UnknownDatabaseType { .. }));
    assert_eq!(
        err.to_string(),
        "geoipdb: reader does not support the \"Acme-Geo-Deluxe\" database type"
    );
}

#[test]
fn garbage_is_an_open_error() {
    let err = Reader::open_from_bytes(b"definitely not a database".to_vec()).unwrap_err();
    assert!(matches!(err, Error::Open { ref origin, .. } if origin == "<bytes>"));
}

#[test]
fn metadata_passes_through() {
    let reader = Reader::open_from_bytes(city_db()).unwrap();
    let meta = reader.metadata();
    assert_eq!(meta.database_type, "GeoIP2-City");
    assert_eq!(meta.binary_format_major_version, 2);
    assert_eq!(meta.binary_format_minor_version, 0);
    assert_eq!(meta.build_epoch, 1_700_000_000);
    assert_eq!(meta.ip_version, 4);
    assert_eq!(meta.languages, ["en", "de"]);
    assert_eq!(meta.node_count, 1);
    assert_eq!(meta.record_size, 24);
    assert_eq!(meta.description["en"], "GeoIP2-City test data");
    assert!(reader.capabilities().contains(Capability::Country));
}

#[test]
fn address_without_data_yields_zero_record() {
    let reader = Reader::open_from_bytes(city_db()).unwrap();
    assert_eq!(
        reader.city(ip(HIGH_IP)).unwrap(),
        geoipdb::City::default()
    );
    assert!(reader.lookup_value(ip(HIGH_IP)).unwrap().is_empty_map());
}

#[test]
fn ipv6_lookup_in_ipv4_database_finds_nothing() {
    let reader = Reader::open_from_bytes(city_db()).unwrap();
    // Depending on the engine this is either refused or resolves to no data.
    match reader.city(ip("ff02::1")) {
        Err(err) => assert!(matches!(err, Error::Lookup { .. }), "{err:?}"),
        Ok(city) => assert_eq!(city, geoipdb::City::default()),
    }
    // The reader keeps working afterwards.
    assert!(reader.city(ip(LOW_IP)).is_ok());
}

#[test]
fn open_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = TestDb::new("GeoIP2-City")
        .low(london())
        .write_to(dir.path(), "city.mmdb");

    let reader = Reader::open(&path).unwrap();
    assert_eq!(reader.city(ip(LOW_IP)).unwrap().country.iso_code, "GB");
    reader.close();

    let mapped = Reader::open_mmap(&path).unwrap();
    assert_eq!(mapped.city(ip(LOW_IP)).unwrap().city.names.english, "London");
    mapped.close();
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.mmdb");
    assert!(Reader::open(&missing).is_err());
    assert!(matches!(Reader::open_mmap(&missing), Err(Error::Io(_))));
}

#[test]
fn reader_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>(_: &T) {}

    let reader = Reader::open_from_bytes(city_db()).unwrap();
    assert_send_sync(&reader);

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let city = reader.city(ip(LOW_IP)).unwrap();
                assert_eq!(city.country.iso_code, "GB");
            });
        }
    });
}
