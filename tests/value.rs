#[cfg(test)]
mod tests {
    use cistern::{AsValue, Blob, Error, Value};
    use time::macros::datetime;
    use uuid::Uuid;

    #[test]
    fn value_bool() {
        let val: Value = true.into();
        assert_eq!(val, Value::Integer(1));
        assert_eq!(bool::try_from_value(Value::Integer(1)).unwrap(), true);
        assert_eq!(bool::try_from_value(Value::Integer(0)).unwrap(), false);
        assert_eq!(bool::try_from_value(Value::Integer(69)).unwrap(), true);
        assert_eq!(bool::try_from_value(Value::Integer(-1)).unwrap(), true);
        assert!(matches!(
            bool::try_from_value(Value::Real(1.0)),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            bool::try_from_value(Value::Text("true".into())),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn value_integers() {
        let val: Value = 127i8.into();
        assert_eq!(val, Value::Integer(127));
        assert_eq!(i8::try_from_value(Value::Integer(127)).unwrap(), 127);
        assert!(matches!(
            i8::try_from_value(Value::Integer(128)),
            Err(Error::TypeMismatch { .. })
        ));
        assert_eq!(i16::try_from_value(Value::Integer(-32768)).unwrap(), -32768);
        assert_eq!(
            i64::try_from_value(Value::Integer(i64::MAX)).unwrap(),
            i64::MAX
        );
        assert_eq!(u8::try_from_value(Value::Integer(255)).unwrap(), 255);
        assert!(matches!(
            u32::try_from_value(Value::Integer(-1)),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            i32::try_from_value(Value::Text("12".into())),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn integral_reals_coerce_to_integers() {
        assert_eq!(i32::try_from_value(Value::Real(5.0)).unwrap(), 5);
        assert_eq!(i64::try_from_value(Value::Real(-3.0)).unwrap(), -3);
        assert!(matches!(
            i32::try_from_value(Value::Real(5.5)),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            i8::try_from_value(Value::Real(300.0)),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            i64::try_from_value(Value::Real(f64::NAN)),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            i64::try_from_value(Value::Real(9.3e18)),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn value_floats() {
        let val: Value = 1.5f64.into();
        assert_eq!(val, Value::Real(1.5));
        assert_eq!(f64::try_from_value(Value::Real(1.5)).unwrap(), 1.5);
        assert_eq!(f64::try_from_value(Value::Integer(3)).unwrap(), 3.0);
        assert_eq!(f32::try_from_value(Value::Real(0.25)).unwrap(), 0.25);
        assert!(matches!(
            f64::try_from_value(Value::Text("1.5".into())),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn value_text() {
        let val: Value = "hello".into();
        assert_eq!(val, Value::Text("hello".into()));
        assert_eq!(
            String::try_from_value(Value::Text("hello".into())).unwrap(),
            "hello"
        );
        assert!(matches!(
            String::try_from_value(Value::Integer(1)),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn value_blob() {
        let val: Value = vec![1u8, 2, 3].into();
        assert_eq!(val, Value::Blob(Blob::Loaded(vec![1, 2, 3].into())));
        assert_eq!(Vec::<u8>::try_from_value(val).unwrap(), vec![1, 2, 3]);
        let empty: Value = Vec::<u8>::new().into();
        assert_eq!(empty, Value::Blob(Blob::Empty));
        assert_eq!(Vec::<u8>::try_from_value(empty).unwrap(), Vec::<u8>::new());
        assert!(matches!(
            Vec::<u8>::try_from_value(Value::Text("bytes".into())),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn value_option() {
        let val: Value = Option::<i64>::None.into();
        assert_eq!(val, Value::Null);
        assert_eq!(Option::<i64>::try_from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<i64>::try_from_value(Value::Integer(7)).unwrap(),
            Some(7)
        );
        let val: Value = Some("x".to_string()).into();
        assert_eq!(val, Value::Text("x".into()));
    }

    #[test]
    fn datetime_from_text() {
        let decoded =
            time::OffsetDateTime::try_from_value(Value::Text("2024-05-18T14:11:35.069Z".into()))
                .unwrap();
        assert_eq!(decoded, datetime!(2024-05-18 14:11:35.069 UTC));
    }

    #[test]
    fn datetime_from_epoch_forms() {
        let from_integer =
            time::OffsetDateTime::try_from_value(Value::Integer(1716041456)).unwrap();
        assert_eq!(from_integer, datetime!(2024-05-18 14:10:56 UTC));
        let from_real = time::OffsetDateTime::try_from_value(Value::Real(1716041456.069)).unwrap();
        assert_eq!(from_real, datetime!(2024-05-18 14:10:56.069 UTC));
        assert_eq!(
            from_real.unix_timestamp_nanos() - from_integer.unix_timestamp_nanos(),
            69_000_000
        );
    }

    #[test]
    fn datetime_round_trip() {
        let instant = datetime!(2021-11-01 09:30:00.250 UTC);
        let encoded = instant.as_value();
        assert_eq!(encoded, Value::Text("2021-11-01 09:30:00.250Z".into()));
        assert_eq!(
            time::OffsetDateTime::try_from_value(encoded).unwrap(),
            instant
        );
    }

    #[test]
    fn value_uuid() {
        let id = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        let encoded = id.as_value();
        assert_eq!(
            encoded,
            Value::Text("67e55044-10b1-426f-9247-bb680e5fe0c8".into())
        );
        assert_eq!(Uuid::try_from_value(encoded).unwrap(), id);
        let blob: Value = id.as_bytes().to_vec().into();
        assert_eq!(Uuid::try_from_value(blob).unwrap(), id);
        assert!(matches!(
            Uuid::try_from_value(Value::Text("not a uuid".into())),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn value_identity() {
        assert_eq!(
            Value::try_from_value(Value::Integer(5)).unwrap(),
            Value::Integer(5)
        );
        assert!(Value::Null.is_null());
        assert_eq!(Value::Real(0.5).storage_class(), "REAL");
    }
}
