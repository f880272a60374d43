use std::collections::VecDeque;

use handoff_fifo::{ByteFifo, Fifo, FifoEmpty, FifoFull};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Runs a random op sequence against both the fifo and a `VecDeque` model.
fn check_against_model(capacity: usize, seed: u64) {
    let mut fifo = Fifo::with_capacity(capacity);
    let mut model: VecDeque<u64> = VecDeque::new();
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut next = 0u64;

    for _ in 0..5_000 {
        let op = rng.random_range(0..100);

        if op < 45 {
            let result = fifo.put(next);
            if model.len() < capacity {
                assert_eq!(result, Ok(()));
                model.push_back(next);
            } else {
                assert_eq!(result, Err(FifoFull(next)));
            }
            next += 1;
        } else if op < 85 {
            assert_eq!(fifo.get().ok(), model.pop_front());
        } else if op < 95 {
            assert_eq!(fifo.peek().ok(), model.front());
        } else if op < 98 {
            let batch: Vec<u64> = (next..next + 3).collect();
            next += 3;
            let room = capacity - model.len();
            let result = fifo.put_all(batch.iter().copied());
            if room >= batch.len() {
                assert_eq!(result, Ok(()));
            } else {
                assert_eq!(result, Err(FifoFull(batch[room])));
            }
            model.extend(batch.iter().copied().take(room));
        } else {
            fifo.clear();
            model.clear();
        }

        assert!(fifo.elements() <= capacity);
        assert_eq!(fifo.elements(), model.len());
        assert_eq!(fifo.is_full(), model.len() == capacity);
        assert_eq!(fifo.is_empty(), model.is_empty());
        assert!(fifo.iter().eq(model.iter()));
    }
}

#[test]
fn random_ops_match_model() {
    for (capacity, seed) in [(1, 1), (2, 7), (3, 42), (16, 1234), (31, 99_999)] {
        check_against_model(capacity, seed);
    }
}

#[test]
fn fifo_ordering() {
    let mut fifo = Fifo::with_capacity(64);
    fifo.put_all(0..64).unwrap();

    for expected in 0..64 {
        assert_eq!(fifo.get(), Ok(expected));
    }
    assert_eq!(fifo.get(), Err(FifoEmpty));
}

#[test]
fn byte_fifo_streams_through_small_buffer() {
    let message = b"the quick brown fox jumps over the lazy dog";
    let mut fifo = Fifo::bytes(5);
    let mut received = Vec::new();

    let mut pending = &message[..];
    while !pending.is_empty() || !fifo.is_empty() {
        let room = fifo.capacity() - fifo.elements();
        let take = room.min(pending.len());
        fifo.put_slice(&pending[..take]).unwrap();
        pending = &pending[take..];

        if let Ok(byte) = fifo.get() {
            received.push(byte);
        }
    }

    assert_eq!(received, message);
}

#[test]
fn byte_fifo_put_slice_partial() {
    let mut fifo = ByteFifo::default();
    let payload = [0xAB; 20];

    assert_eq!(fifo.put_slice(&payload), Err(FifoFull(0xAB)));
    assert!(fifo.is_full());
    assert_eq!(fifo.elements(), handoff_fifo::DEFAULT_CAPACITY);
}

#[test]
fn moves_across_threads() {
    let mut fifo = Fifo::with_capacity(8);
    fifo.put_all(["x".to_string(), "y".to_string()]).unwrap();

    let handle = std::thread::spawn(move || {
        let mut fifo = fifo;
        fifo.put("z".to_string()).unwrap();
        fifo.drain().collect::<Vec<_>>()
    });

    assert_eq!(handle.join().unwrap(), ["x", "y", "z"]);
}
