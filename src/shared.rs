//! Per-stream shared-object tables used by both wire codecs to intern
//! repeated struct references.

use crate::object::SharedObject;
use std::collections::HashMap;
use std::rc::Rc;

/// Encoder-side table: object pointer identity -> the index it was first
/// assigned, in encounter order starting at 1.
#[derive(Default)]
pub struct EncoderRefTable {
  ids: HashMap<usize, u32>,
  next_id: u32,
}

impl EncoderRefTable {
  pub fn new() -> Self {
    EncoderRefTable {
      ids: HashMap::new(),
      next_id: 1,
    }
  }

  fn key(obj: &SharedObject) -> usize {
    Rc::as_ptr(obj) as *const () as usize
  }

  /// Returns `(id, true)` if `obj` was already interned, or `(id, false)`
  /// after registering it for first use with a freshly assigned id.
  pub fn intern(&mut self, obj: &SharedObject) -> (u32, bool) {
    let key = Self::key(obj);
    if let Some(id) = self.ids.get(&key) {
      return (*id, true);
    }
    let id = self.next_id;
    self.next_id += 1;
    self.ids.insert(key, id);
    (id, false)
  }

  /// True if `obj` has already been assigned an id (used for write-side
  /// cycle detection: re-entering the body of an object currently being
  /// written is an error, not a second reference).
  pub fn is_known(&self, obj: &SharedObject) -> bool {
    self.ids.contains_key(&Self::key(obj))
  }
}

/// Decoder-side table: index -> the object registered at that index.
/// Objects are inserted before their body is read, so read-side cycles
/// (a shared object whose body references itself) resolve correctly.
#[derive(Default)]
pub struct DecoderRefTable {
  objects: HashMap<u32, SharedObject>,
}

impl DecoderRefTable {
  pub fn new() -> Self {
    DecoderRefTable { objects: HashMap::new() }
  }

  pub fn register(&mut self, id: u32, obj: SharedObject) {
    self.objects.insert(id, obj);
  }

  pub fn get(&self, id: u32) -> Option<SharedObject> {
    self.objects.get(&id).cloned()
  }
}
