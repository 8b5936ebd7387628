use crate::value::Value;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::{debug, trace};

pub type FrameId = usize;

/// The frame that holds global variables; it is never released.
pub const GLOBAL_FRAME: FrameId = 0;

// Detached frames tolerated before `should_collect` asks for a collection.
const MIN_COLLECT_THRESHOLD: usize = 64;

#[derive(Debug, Default)]
struct Frame {
    values: HashMap<String, Value>,
    parent: Option<FrameId>,
    // Allocated and not yet recycled.
    live: bool,
    // Its block or call is still executing.
    active: bool,
    // A closure was declared in this frame or a descendant.
    captured: bool,
}

/// Arena of runtime frames. Each frame maps names to values and points at its parent by
/// index; lookups walk the parent chain.
///
/// A popped frame is recycled at once unless a closure may still refer to it. Such frames
/// are detached and reclaimed by [`Environment::collect_garbage`] once no active frame can
/// reach them through variables, arrays, closures or parent links.
#[derive(Debug)]
pub struct Environment {
    frames: Vec<Frame>,
    free: Vec<FrameId>,
    detached: Vec<FrameId>,
    collect_threshold: usize,
}

impl Environment {
    pub fn new() -> Self {
        let globals = Frame {
            live: true,
            active: true,
            captured: true,
            ..Frame::default()
        };
        Self {
            frames: vec![globals],
            free: Vec::new(),
            detached: Vec::new(),
            collect_threshold: MIN_COLLECT_THRESHOLD,
        }
    }

    /// Allocate a child frame of `parent`.
    pub fn push(&mut self, parent: FrameId) -> FrameId {
        let frame = Frame {
            parent: Some(parent),
            live: true,
            active: true,
            ..Frame::default()
        };

        let id = match self.free.pop() {
            Some(id) => {
                self.frames[id] = frame;
                id
            }
            None => {
                self.frames.push(frame);
                self.frames.len() - 1
            }
        };
        trace!(frame = id, parent, "push frame");
        id
    }

    /// Leave a frame pushed with [`Environment::push`]. Captured frames are detached
    /// instead of recycled.
    pub fn pop(&mut self, id: FrameId) {
        trace!(frame = id, "pop frame");
        let frame = &mut self.frames[id];
        if id == GLOBAL_FRAME || !frame.live || !frame.active {
            return;
        }
        frame.active = false;
        if frame.captured {
            self.detached.push(id);
        } else {
            self.release(id);
        }
    }

    /// Mark `id` and its ancestors as possibly referenced by a closure.
    pub fn capture(&mut self, id: FrameId) {
        let mut current = Some(id);
        while let Some(frame_id) = current {
            let frame = &mut self.frames[frame_id];
            if frame.captured {
                break;
            }
            frame.captured = true;
            current = frame.parent;
        }
    }

    /// Bind `name` in frame `id`, replacing any binding of the same name in that frame.
    pub fn define(&mut self, id: FrameId, name: &str, value: Value) {
        self.frames[id].values.insert(name.to_string(), value);
    }

    pub fn get(&self, id: FrameId, name: &str) -> Option<&Value> {
        let mut current = Some(id);
        while let Some(frame_id) = current {
            let frame = &self.frames[frame_id];
            if let Some(value) = frame.values.get(name) {
                return Some(value);
            }
            current = frame.parent;
        }
        None
    }

    /// Update the nearest existing binding of `name`. Returns `false` if there is none.
    pub fn assign(&mut self, id: FrameId, name: &str, value: Value) -> bool {
        let mut current = Some(id);
        while let Some(frame_id) = current {
            let frame = &mut self.frames[frame_id];
            if let Some(slot) = frame.values.get_mut(name) {
                *slot = value;
                return true;
            }
            current = frame.parent;
        }
        false
    }

    /// Number of frames currently allocated and not recycled.
    pub fn live_frames(&self) -> usize {
        self.frames.iter().filter(|frame| frame.live).count()
    }

    pub fn should_collect(&self) -> bool {
        self.detached.len() >= self.collect_threshold
    }

    /// Recycle detached frames that no active frame can reach. Values held outside the
    /// arena are not roots, so callers only collect when they hold none.
    pub fn collect_garbage(&mut self) -> usize {
        let mut reachable = vec![false; self.frames.len()];
        let mut pending: Vec<FrameId> = self
            .frames
            .iter()
            .enumerate()
            .filter(|(_, frame)| frame.live && frame.active)
            .map(|(id, _)| id)
            .collect();
        let mut seen_arrays = HashSet::new();

        while let Some(id) = pending.pop() {
            if reachable[id] {
                continue;
            }
            reachable[id] = true;

            let frame = &self.frames[id];
            pending.extend(frame.parent);
            for value in frame.values.values() {
                trace_value(value, &mut pending, &mut seen_arrays);
            }
        }

        let detached = std::mem::take(&mut self.detached);
        let mut freed = 0;
        for id in detached {
            if reachable[id] {
                self.detached.push(id);
            } else {
                self.release(id);
                freed += 1;
            }
        }

        self.collect_threshold = (self.detached.len() * 2).max(MIN_COLLECT_THRESHOLD);
        debug!(freed, retained = self.detached.len(), "collected frames");
        freed
    }

    fn release(&mut self, id: FrameId) {
        self.frames[id] = Frame::default();
        self.free.push(id);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

fn trace_value(value: &Value, pending: &mut Vec<FrameId>, seen_arrays: &mut HashSet<usize>) {
    match value {
        Value::Closure(closure) => pending.push(closure.captured),
        Value::Array(elements) => {
            // Arrays can contain themselves.
            if seen_arrays.insert(Rc::as_ptr(elements) as usize) {
                for element in elements.borrow().iter() {
                    trace_value(element, pending, seen_arrays);
                }
            }
        }
        _ => {}
    }
}
