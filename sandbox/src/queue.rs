//! Strict-FIFO completion scheduler for external queries.
//!
//! External queries (account balance, code, historical block hash,
//! nested calls) are conceptually asynchronous, yet the module expects
//! their effects to become visible in exactly the order it issued the
//! host calls. The ops queue enforces that: entry *i*'s completion (and
//! any resulting memory write and module resumption) runs only after
//! entry *i−1* has fully completed, even when entry *i*'s result settles
//! first.
//!
//! There is no cancellation. A completion error aborts the invocation
//! fatally; nothing is retried.

use std::collections::VecDeque;

use eei_hostapi::{EeiError, ModuleResume};

use crate::env::Environment;

/// Identifier handed back by [`OpsQueue::push`], used to deliver the
/// operation's result.
pub type OpId = u64;

/// Completion logic for one pending operation: applies the resolved
/// result to the environment and module memory.
pub type Completion =
    Box<dyn FnOnce(&mut Environment, &mut [u8], Vec<u8>) -> Result<(), EeiError> + Send>;

struct PendingOp {
    id: OpId,
    callback_index: u32,
    result: Option<Vec<u8>>,
    on_complete: Option<Completion>,
}

/// FIFO pending-operation list with out-of-order result delivery and
/// strictly in-order completion.
#[derive(Default)]
pub struct OpsQueue {
    ops: VecDeque<PendingOp>,
    next_id: OpId,
}

impl OpsQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pending operation. Its completion will not run before
    /// every earlier entry has completed, regardless of when its result
    /// arrives.
    pub fn push(&mut self, callback_index: u32, on_complete: Completion) -> OpId {
        let id = self.next_id;
        self.next_id += 1;
        self.ops.push_back(PendingOp {
            id,
            callback_index,
            result: None,
            on_complete: Some(on_complete),
        });
        id
    }

    /// Deliver the result for a pending operation. May arrive in any
    /// order relative to other entries.
    pub fn complete(&mut self, id: OpId, result: Vec<u8>) -> Result<(), EeiError> {
        let op = self
            .ops
            .iter_mut()
            .find(|op| op.id == id)
            .ok_or_else(|| EeiError::Internal(format!("unknown pending op {id}")))?;
        if op.result.is_some() {
            return Err(EeiError::Internal(format!("pending op {id} completed twice")));
        }
        op.result = Some(result);
        Ok(())
    }

    /// Run completions for the resolved prefix of the queue, in
    /// submission order, resuming the module after each one.
    ///
    /// Returns the number of operations drained. Stops at the first
    /// entry whose result has not arrived yet.
    pub fn drain(
        &mut self,
        env: &mut Environment,
        mem: &mut [u8],
        resume: &mut dyn ModuleResume,
    ) -> Result<usize, EeiError> {
        let mut drained = 0;
        while self.ops.front().is_some_and(|op| op.result.is_some()) {
            let mut op = self
                .ops
                .pop_front()
                .ok_or_else(|| EeiError::Internal("ops queue front vanished".into()))?;
            let result = op
                .result
                .take()
                .ok_or_else(|| EeiError::Internal("resolved op lost its result".into()))?;
            let on_complete = op
                .on_complete
                .take()
                .ok_or_else(|| EeiError::Internal("pending op lost its completion".into()))?;
            on_complete(env, mem, result)?;
            resume.resume(op.callback_index)?;
            drained += 1;
        }
        Ok(drained)
    }

    /// Number of operations still pending.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true if no operations are pending.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvConfig;
    use crate::env::StateHandle;
    use eei_hostapi::traits::EmptyHistory;
    use eei_hostapi::MemAccounts;
    use std::sync::{Arc, Mutex};

    /// Resume hook that records the callback indices it sees.
    #[derive(Default)]
    struct RecordingResume {
        seen: Vec<u32>,
    }

    impl ModuleResume for RecordingResume {
        fn resume(&mut self, callback_index: u32) -> Result<(), EeiError> {
            self.seen.push(callback_index);
            Ok(())
        }
    }

    fn test_env() -> Environment {
        let state: StateHandle = Arc::new(Mutex::new(MemAccounts::new()));
        Environment::new(EnvConfig::default(), state, Arc::new(EmptyHistory))
    }

    fn effect_recorder(
        effects: &Arc<Mutex<Vec<u32>>>,
        tag: u32,
    ) -> Completion {
        let effects = Arc::clone(effects);
        Box::new(move |_env, _mem, _result| {
            effects
                .lock()
                .map_err(|_| EeiError::Internal("effects lock".into()))?
                .push(tag);
            Ok(())
        })
    }

    #[test]
    fn test_in_order_completion_drains_immediately() {
        let mut queue = OpsQueue::new();
        let mut env = test_env();
        let mut mem = vec![0u8; 8];
        let mut resume = RecordingResume::default();
        let effects = Arc::new(Mutex::new(Vec::new()));

        let a = queue.push(10, effect_recorder(&effects, 1));
        queue.complete(a, vec![]).unwrap();
        assert_eq!(queue.drain(&mut env, &mut mem, &mut resume).unwrap(), 1);
        assert!(queue.is_empty());
        assert_eq!(resume.seen, vec![10]);
    }

    #[test]
    fn test_out_of_order_settlement_serialized() {
        // Submit 1..4, settle in a scrambled order, drain after each
        // settlement: effects must still appear in submission order.
        let mut queue = OpsQueue::new();
        let mut env = test_env();
        let mut mem = vec![0u8; 8];
        let mut resume = RecordingResume::default();
        let effects = Arc::new(Mutex::new(Vec::new()));

        let ids: Vec<OpId> = (1..=4)
            .map(|tag| queue.push(tag, effect_recorder(&effects, tag)))
            .collect();

        for settle_index in [2usize, 0, 3, 1] {
            queue.complete(ids[settle_index], vec![]).unwrap();
            queue.drain(&mut env, &mut mem, &mut resume).unwrap();
        }

        assert!(queue.is_empty());
        assert_eq!(*effects.lock().unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(resume.seen, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_drain_stops_at_unresolved_front() {
        let mut queue = OpsQueue::new();
        let mut env = test_env();
        let mut mem = vec![0u8; 8];
        let mut resume = RecordingResume::default();
        let effects = Arc::new(Mutex::new(Vec::new()));

        let first = queue.push(1, effect_recorder(&effects, 1));
        let second = queue.push(2, effect_recorder(&effects, 2));

        // Only the second has settled: nothing may run.
        queue.complete(second, vec![]).unwrap();
        assert_eq!(queue.drain(&mut env, &mut mem, &mut resume).unwrap(), 0);
        assert!(effects.lock().unwrap().is_empty());

        queue.complete(first, vec![]).unwrap();
        assert_eq!(queue.drain(&mut env, &mut mem, &mut resume).unwrap(), 2);
        assert_eq!(*effects.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_completion_writes_memory() {
        let mut queue = OpsQueue::new();
        let mut env = test_env();
        let mut mem = vec![0u8; 8];
        let mut resume = RecordingResume::default();

        let id = queue.push(
            0,
            Box::new(|_env, mem, result| crate::memory::write_bytes(mem, 2, &result)),
        );
        queue.complete(id, vec![0xaa, 0xbb]).unwrap();
        queue.drain(&mut env, &mut mem, &mut resume).unwrap();
        assert_eq!(&mem[2..4], &[0xaa, 0xbb]);
    }

    #[test]
    fn test_completion_error_is_fatal() {
        let mut queue = OpsQueue::new();
        let mut env = test_env();
        let mut mem = vec![0u8; 8];
        let mut resume = RecordingResume::default();

        let id = queue.push(
            0,
            Box::new(|_env, _mem, _result| {
                Err(EeiError::Internal("query backend failed".into()))
            }),
        );
        queue.complete(id, vec![]).unwrap();
        let err = queue.drain(&mut env, &mut mem, &mut resume).unwrap_err();
        assert!(matches!(err, EeiError::Internal(_)));
    }

    #[test]
    fn test_unknown_and_double_completion_rejected() {
        let mut queue = OpsQueue::new();
        assert!(queue.complete(99, vec![]).is_err());
        let id = queue.push(0, Box::new(|_, _, _| Ok(())));
        queue.complete(id, vec![]).unwrap();
        assert!(queue.complete(id, vec![]).is_err());
    }
}
