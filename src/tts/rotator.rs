//! 凭据轮询：在一组等价的 API Key 之间 round-robin
//!
//! 游标为进程级共享状态，用一次 fetch_update 原子推进；不做健康检查，被拒绝的 key 下一轮照常返回。

use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
pub struct KeyRotator<T> {
    pool: Vec<T>,
    cursor: AtomicUsize,
}

impl<T> KeyRotator<T> {
    pub fn new(pool: Vec<T>) -> Self {
        Self {
            pool,
            cursor: AtomicUsize::new(0),
        }
    }

    /// 下一个凭据；池为空时返回 None
    pub fn next_key(&self) -> Option<&T> {
        let len = self.pool.len();
        if len == 0 {
            return None;
        }
        let idx = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |i| Some((i + 1) % len))
            .unwrap_or_else(|i| i);
        self.pool.get(idx)
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_empty_pool() {
        let rotator: KeyRotator<String> = KeyRotator::new(Vec::new());
        assert!(rotator.next_key().is_none());
        assert!(rotator.is_empty());
    }

    #[test]
    fn test_cycles_in_pool_order() {
        let rotator = KeyRotator::new(vec!["a", "b", "c"]);
        let got: Vec<_> = (0..7).map(|_| *rotator.next_key().unwrap()).collect();
        assert_eq!(got, vec!["a", "b", "c", "a", "b", "c", "a"]);
    }

    #[test]
    fn test_single_key_always_returned() {
        let rotator = KeyRotator::new(vec!["only"]);
        for _ in 0..5 {
            assert_eq!(rotator.next_key(), Some(&"only"));
        }
    }

    #[test]
    fn test_even_distribution_across_threads() {
        let m: usize = 3;
        let k: usize = 1000;
        let rotator = Arc::new(KeyRotator::new((0..m).collect::<Vec<usize>>()));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let rotator = Arc::clone(&rotator);
                let n = if t == 0 { k - 3 * (k / 4) } else { k / 4 };
                std::thread::spawn(move || {
                    (0..n).map(|_| *rotator.next_key().unwrap()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut counts: HashMap<usize, usize> = HashMap::new();
        for h in handles {
            for key in h.join().unwrap() {
                *counts.entry(key).or_default() += 1;
            }
        }
        for key in 0..m {
            let c = counts.get(&key).copied().unwrap_or_default();
            assert!(c == k / m || c == k.div_ceil(m), "key {key} returned {c} times");
        }
    }
}
