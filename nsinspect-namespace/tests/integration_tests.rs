use nix::net::if_::InterfaceFlags as Iff;
use nsinspect_core::Error;
use nsinspect_namespace::*;

#[test]
fn test_missing_process_namespace() {
    let proc_root = tempfile::tempdir().unwrap();
    let inspector = NetnsInspector::new(NetnsConfig::new().with_proc_root(proc_root.path()));

    let result = inspector.inspect(ProcessId::from_raw(31337));

    match result {
        Err(Error::NamespaceNotFound { path }) => {
            assert!(path.starts_with(proc_root.path()));
            assert!(path.ends_with("31337/ns/net"));
        }
        other => panic!("expected NamespaceNotFound, got {other:?}"),
    }
}

#[test]
fn test_non_namespace_handle_is_rejected() {
    let proc_root = tempfile::tempdir().unwrap();
    let ns_dir = proc_root.path().join("55").join("ns");
    std::fs::create_dir_all(&ns_dir).unwrap();
    let handle = ns_dir.join("net");
    std::fs::write(handle, b"not a namespace").unwrap();

    let inspector = NetnsInspector::new(NetnsConfig::new().with_proc_root(proc_root.path()));
    let err = inspector.inspect(ProcessId::from_raw(55)).unwrap_err();

    assert!(err.is_namespace_unavailable());
}

#[test]
fn test_caller_thread_namespace_untouched_on_failure() {
    let before = std::fs::read_link("/proc/thread-self/ns/net").unwrap();

    let inspector = NetnsInspector::new(NetnsConfig::new().with_proc_root("/nonexistent"));
    assert!(inspector.inspect(ProcessId::from_raw(1)).is_err());

    let after = std::fs::read_link("/proc/thread-self/ns/net").unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_mock_source_end_to_end() {
    let loopback = Iff::IFF_UP | Iff::IFF_LOOPBACK;
    let lo = Link::new(1, "lo", loopback).with_mtu(65536);
    let eth0 = Link::new(3, "eth0", Iff::IFF_BROADCAST).with_mtu(1500);
    let eth1 = Link::new(4, "eth1", Iff::IFF_UP | Iff::IFF_BROADCAST)
        .with_mtu(9000)
        .with_hardware_addr(vec![0x02, 0, 0, 0, 0, 0x04]);

    let source = MockSource::new()
        .with_link(lo, &["127.0.0.1/8"])
        .with_link(eth0, &["10.1.0.3/16"])
        .with_link(eth1, &["192.168.50.4/24"]);

    let interfaces = collect_interfaces(&source).unwrap();
    let snapshot = NetworkNamespaceSnapshot::from_interfaces(interfaces);

    // eth0 is down, so eth1 is the first qualifying interface
    assert_eq!(snapshot.primary_interface, 4);
    let primary = snapshot.primary().unwrap();
    assert_eq!(primary.mtu, 9000);
    assert_eq!(primary.hardware_addr, "02:00:00:00:00:04");
}

#[test]
fn test_collect_is_idempotent() {
    let eth0 = Link::new(2, "eth0", Iff::IFF_UP).with_mtu(1500);
    let source = MockSource::new().with_link(eth0, &["10.0.0.2/24"]);

    let first = collect_interfaces(&source).unwrap();
    let second = collect_interfaces(&source).unwrap();
    assert_eq!(
        NetworkNamespaceSnapshot::from_interfaces(first),
        NetworkNamespaceSnapshot::from_interfaces(second)
    );
}

#[test]
#[ignore = "requires root"]
fn test_inspect_own_namespace() {
    let inspector = NetnsInspector::with_defaults();

    let snapshot = inspector.inspect(ProcessId::current()).unwrap();

    let lo = snapshot
        .interfaces
        .iter()
        .find(|i| i.name == "lo")
        .expect("loopback present");
    assert_eq!(lo.index, 1);
    assert!(lo.hardware_addr.is_empty());
    assert_ne!(snapshot.primary_interface, lo.index);
}

#[test]
#[ignore = "requires root"]
fn test_repeated_inspection_is_identical() {
    let inspector = NetnsInspector::with_defaults();

    let first = inspector.inspect(ProcessId::current()).unwrap();
    let second = inspector.inspect(ProcessId::current()).unwrap();

    assert_eq!(first, second);
}
