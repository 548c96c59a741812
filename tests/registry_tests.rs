use parking_lot::Mutex;
use sigma::{from_str, sigma_record, to_string, Error, Types, Value};
use std::thread;

// Types::clear wipes the whole process-wide registry.
static LOCK: Mutex<()> = parking_lot::const_mutex(());

#[derive(Clone, Debug, Default, PartialEq)]
struct Account {
    id: u64,
    owner: String,
}

sigma_record!(Account { id, owner });

#[derive(Clone, Debug, Default, PartialEq)]
struct Invoice {
    number: u32,
}

sigma_record!(Invoice { number });

#[test]
fn test_register_and_resolve() {
    let _guard = LOCK.lock();
    Types::clear();
    assert!(Types::resolve_by_name("account").is_none());

    Types::register::<Account>("Account").unwrap();
    let by_name = Types::resolve_by_name("ACCOUNT").unwrap();
    assert_eq!(by_name.name(), "Account");
    let by_type = Types::resolve_by_type::<Account>().unwrap();
    assert_eq!(by_type.type_id(), by_name.type_id());
    assert!(by_type.rust_name().ends_with("Account"));

    let account = Account {
        id: 7,
        owner: "ann".into(),
    };
    assert_eq!(to_string(&account).unwrap(), r#"Account{id=7,owner="ann"}"#);
    let back: Account = from_str(r#"account{ID=7,Owner="ann"}"#).unwrap().unwrap();
    assert_eq!(back, account);
}

#[test]
fn test_reregistering_keeps_old_names() {
    let _guard = LOCK.lock();
    Types::clear();
    Types::register::<Invoice>("invoice").unwrap();
    Types::register::<Invoice>("bill").unwrap();

    assert_eq!(to_string(&Invoice { number: 3 }).unwrap(), "bill{number=3}");
    let old: Invoice = from_str("invoice{number=4}").unwrap().unwrap();
    assert_eq!(old, Invoice { number: 4 });
}

#[test]
fn test_name_reassigned_to_new_type() {
    let _guard = LOCK.lock();
    Types::clear();
    Types::register::<Account>("entry").unwrap();
    Types::register::<Invoice>("entry").unwrap();

    let value: Value = from_str("entry{number=1}").unwrap().unwrap();
    match value {
        Value::Record(record) => assert!(record.is::<Invoice>()),
        other => panic!("expected a record, got {:?}", other),
    }
}

#[test]
fn test_clear() {
    let _guard = LOCK.lock();
    Types::register::<Account>("account").unwrap();
    Types::clear();
    assert!(Types::resolve_by_name("account").is_none());
    assert!(Types::resolve_by_type::<Account>().is_none());

    let err = to_string(&Account::default()).unwrap_err();
    assert!(matches!(err, Error::UnregisteredType(_)));
    let err = from_str::<Value>("account{}").unwrap_err();
    assert!(matches!(err, Error::UnknownType { .. }));
}

#[test]
fn test_concurrent_registration_and_reads() {
    let _guard = LOCK.lock();
    Types::clear();
    Types::register::<Account>("account").unwrap();

    thread::scope(|scope| {
        for i in 0..8 {
            scope.spawn(move || {
                let alias = format!("alias{}", i);
                Types::register::<Invoice>(&alias).unwrap();
                for n in 0..100u32 {
                    let text = format!("{}{{number={}}}", alias, n);
                    let invoice: Invoice = from_str(&text).unwrap().unwrap();
                    assert_eq!(invoice.number, n);
                    let account: Account = from_str("account{id=1}").unwrap().unwrap();
                    assert_eq!(account.id, 1);
                }
            });
        }
    });

    for i in 0..8 {
        assert!(Types::resolve_by_name(&format!("ALIAS{}", i)).is_some());
    }
}

#[test]
fn test_register_rejects_names_the_reader_cannot_parse() {
    let _guard = LOCK.lock();
    Types::clear();
    let err = Types::register::<Invoice>("1x").unwrap_err();
    assert!(matches!(err, Error::InvalidTypeName(_)));
    assert!(err.to_string().contains("invalid record type name '1x'"));
    assert!(Types::register::<Invoice>("bad name").is_err());
    assert!(Types::resolve_by_type::<Invoice>().is_none());

    Types::register::<Invoice>("faktúra.v2").unwrap();
    let text = to_string(&Invoice { number: 5 }).unwrap();
    assert_eq!(text, "faktúra.v2{number=5}");
    let back: Invoice = from_str(&text).unwrap().unwrap();
    assert_eq!(back, Invoice { number: 5 });
}
