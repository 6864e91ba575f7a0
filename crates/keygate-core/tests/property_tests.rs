//! Property-based tests for keygate-core using proptest

use proptest::prelude::*;
use keygate_core::{
    fingerprint::FINGERPRINT_HEX_LEN, AttributeMap, DeviceFinder, DeviceRecord, Fingerprint,
    LabelFinder, SerialValidator, StaticSource, Validator, VOLUME_NAME, VOLUME_SERIAL_NUMBER,
};

fn record_with_serial(serial: &str) -> DeviceRecord {
    DeviceRecord {
        volume_name: Some("TESTDISK".to_string()),
        volume_serial_number: Some(serial.to_string()),
        ..Default::default()
    }
}

fn arb_device() -> impl Strategy<Value = AttributeMap> {
    (
        prop_oneof![Just("TESTDISK".to_string()), "[A-Z]{1,11}"],
        "[0-9A-F]{8}",
    )
        .prop_map(|(label, serial)| {
            let mut device = AttributeMap::new();
            device.insert(VOLUME_NAME.to_string(), label);
            device.insert(VOLUME_SERIAL_NUMBER.to_string(), serial);
            device
        })
}

proptest! {
    #[test]
    fn fingerprint_is_deterministic_uppercase_hex(s in ".*") {
        let a = Fingerprint::of(&s);
        let b = Fingerprint::of(&s);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.as_str().len(), FINGERPRINT_HEX_LEN);
        prop_assert!(a.as_str().chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn check_matches_fingerprint_equality(seed in "[0-9A-Fa-f]{1,12}", serial in "[0-9A-Fa-f]{1,12}") {
        let validator = SerialValidator::new(&seed);
        let expected = Fingerprint::of(&serial) == Fingerprint::of(&seed);
        prop_assert_eq!(validator.check(&record_with_serial(&serial)).unwrap(), expected);
    }

    #[test]
    fn single_character_change_rejects(serial in "[0-9A-F]{8}", idx in 0usize..8) {
        let validator = SerialValidator::new(&serial);
        prop_assert!(validator.check(&record_with_serial(&serial)).unwrap());

        let mut altered: Vec<char> = serial.chars().collect();
        altered[idx] = if altered[idx] == '0' { '1' } else { '0' };
        let altered: String = altered.into_iter().collect();
        prop_assert!(!validator.check(&record_with_serial(&altered)).unwrap());
    }

    #[test]
    fn has_device_named_agrees_with_find(devices in prop::collection::vec(arb_device(), 0..6)) {
        let finder = LabelFinder::new(StaticSource::new(devices));
        prop_assert_eq!(
            finder.has_device_named("TESTDISK").unwrap(),
            finder.find_device_by_label("TESTDISK").unwrap().is_some()
        );
    }
}
