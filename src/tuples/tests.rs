//! Tuple Directory Tests
//!
//! ## Test Scopes
//! - **Set semantics**: idempotent inserts, no-op deletes, pruning of emptied keys.
//! - **Host expiry**: sweeping a host out of every key.
//! - **Iteration**: early stop, and mutation of the directory while walking it.

#[cfg(test)]
mod tests {
    use crate::error::KelipsError;
    use crate::membership::types::HostId;
    use crate::tuples::directory::TupleDirectory;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn host(port: u16) -> HostId {
        HostId(format!("127.0.0.1:{}", port))
    }

    fn key(i: usize) -> Vec<u8> {
        format!("filetuple{}", i).into_bytes()
    }

    // ============================================================
    // SET SEMANTICS
    // ============================================================

    #[test]
    fn test_insert_get_delete() {
        let ft = TupleDirectory::new();

        for i in 0..10 {
            ft.insert(&key(i), host(1234 + i as u16));
        }
        for i in 0..5 {
            ft.insert(&key(i), host(21234));
        }
        assert!(!ft.insert(&key(0), host(21234)), "duplicate insert is a no-op");

        for i in 0..10 {
            let hosts = ft.get(&key(i)).expect("tuple should exist");
            assert_eq!(hosts.len(), if i < 5 { 2 } else { 1 });
        }

        for i in 0..5 {
            assert!(ft.delete(&key(i), &host(21234)));
        }
        for i in 0..10 {
            assert_eq!(ft.get(&key(i)).unwrap().len(), 1);
        }
        assert_eq!(ft.count(), 10);
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let ft = TupleDirectory::new();
        assert!(!ft.delete(b"missing", &host(1)));

        ft.insert(b"k1", host(1));
        assert!(!ft.delete(b"k1", &host(2)));
        assert_eq!(ft.get(b"k1").unwrap(), vec![host(1)]);
    }

    #[test]
    fn test_last_delete_prunes_key() {
        let ft = TupleDirectory::new();
        ft.insert(b"k1", host(1));
        assert!(ft.delete(b"k1", &host(1)));

        assert_eq!(ft.count(), 0);
        assert!(ft.is_empty());
        let err = ft.get(b"k1").unwrap_err();
        assert!(matches!(err, KelipsError::KeyNotFound(ref k) if k == "k1"));
        assert!(err.is_not_found());
    }

    // ============================================================
    // HOST EXPIRY
    // ============================================================

    #[test]
    fn test_expire_host_removes_everywhere() {
        let ft = TupleDirectory::new();
        let a = HostId::from("A");
        let b = HostId::from("B");
        ft.insert(b"k1", a.clone());
        ft.insert(b"k2", a.clone());
        ft.insert(b"k2", b.clone());

        assert!(ft.expire_host(&a));

        assert!(ft.get(b"k1").is_err(), "k1 is left with no hosts");
        assert_eq!(ft.get(b"k2").unwrap(), vec![b.clone()]);
        assert_eq!(ft.count(), 1);

        assert!(!ft.expire_host(&a), "second sweep finds nothing");
    }

    #[test]
    fn test_expire_host_leaves_others() {
        let ft = TupleDirectory::new();
        for i in 0..10 {
            ft.insert(&key(i), host(1234 + i as u16));
        }
        let h = host(11234);
        for i in 0..5 {
            ft.insert(&key(i), h.clone());
        }

        assert!(ft.expire_host(&h));
        for i in 0..10 {
            assert_eq!(ft.get(&key(i)).unwrap().len(), 1);
        }
        assert!(!ft.hosts().contains(&h));
        assert_eq!(ft.hosts().len(), 10);
    }

    // ============================================================
    // ITERATION
    // ============================================================

    #[test]
    fn test_iter_visits_every_pair_once() {
        let ft = TupleDirectory::new();
        for i in 0..50 {
            ft.insert(&key(i), host(1));
            ft.insert(&key(i), host(2));
        }

        let mut seen = HashSet::new();
        for (k, hosts) in ft.iter() {
            assert_eq!(hosts.len(), 2);
            assert!(seen.insert(k), "key visited twice");
        }
        assert_eq!(seen.len(), 50);
    }

    #[test]
    fn test_iterate_stops_early() {
        let ft = TupleDirectory::new();
        for i in 0..20 {
            ft.insert(&key(i), host(1));
        }

        let mut visited = 0;
        ft.iterate(|_, _| {
            visited += 1;
            visited < 3
        });
        assert_eq!(visited, 3);
    }

    #[test]
    fn test_mutating_inside_iterate_does_not_deadlock() {
        let ft = TupleDirectory::new();
        for i in 0..20 {
            ft.insert(&key(i), host(1));
        }

        ft.iterate(|k, hosts| {
            for h in hosts {
                ft.delete(k, h);
            }
            ft.insert(k, host(2));
            true
        });

        assert_eq!(ft.count(), 20);
        assert!(ft.iter().all(|(_, hosts)| hosts == vec![host(2)]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_and_expiry() {
        let ft = Arc::new(TupleDirectory::new());

        let mut handles = Vec::new();
        for t in 0..4u16 {
            let ft = ft.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                for i in 0..200 {
                    ft.insert(&key(i), host(t));
                    ft.insert(&key(i), host(9999));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(ft.count(), 200);
        assert!(ft.iter().all(|(_, hosts)| hosts.len() == 5));

        let sweeper = {
            let ft = ft.clone();
            tokio::task::spawn_blocking(move || ft.expire_host(&host(9999)))
        };
        let reader = {
            let ft = ft.clone();
            tokio::task::spawn_blocking(move || ft.iter().count())
        };
        assert!(sweeper.await.unwrap());
        assert_eq!(reader.await.unwrap(), 200);

        assert!(ft.iter().all(|(_, hosts)| hosts.len() == 4));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_emptied_key_never_observed_under_churn() {
        let ft = Arc::new(TupleDirectory::new());
        ft.insert(b"stable", host(1));
        let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));

        let writer = {
            let ft = ft.clone();
            let stop = stop.clone();
            tokio::task::spawn_blocking(move || {
                for _ in 0..50_000 {
                    ft.insert(b"k", host(7));
                    assert!(ft.delete(b"k", &host(7)));
                }
                stop.store(true, std::sync::atomic::Ordering::SeqCst);
            })
        };

        let reader = {
            let ft = ft.clone();
            let stop = stop.clone();
            tokio::task::spawn_blocking(move || {
                while !stop.load(std::sync::atomic::Ordering::SeqCst) {
                    let count = ft.count();
                    let listed = ft.iter().count();
                    assert!((1..=2).contains(&count), "count={}", count);
                    assert!((1..=2).contains(&listed), "listed={}", listed);
                    assert!(ft.hosts().len() <= 2);
                }
            })
        };

        writer.await.unwrap();
        reader.await.unwrap();

        assert_eq!(ft.count(), 1);
        assert!(ft.get(b"k").is_err());
    }
}
