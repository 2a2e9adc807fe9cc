use super::UniformValue;

/// Names of the uniforms every canvas installs at construction.
///
/// These are the exact field names shaders see in the generated uniform
/// struct, so they stay camelCase.
pub mod builtin {
    pub const SCREEN_WIDTH: &str = "screenWidth";
    pub const SCREEN_HEIGHT: &str = "screenHeight";
    pub const TIME: &str = "time";
    pub const DELTA_TIME: &str = "deltaTime";
    pub const FRAME: &str = "frame";
}

/// Ordered name → value mapping for one canvas.
///
/// Entries keep their insertion order because the order doubles as the field
/// order of the generated WGSL struct. The table is small (a handful of
/// entries), so lookups are linear scans.
///
/// Invariant: after `with_builtins`, the five built-in entries are always
/// present; callers can overwrite their values but nothing removes a key.
#[derive(Debug, Clone, Default)]
pub struct UniformTable {
    entries: Vec<(String, UniformValue)>,
}

impl UniformTable {
    /// Creates a table pre-populated with the built-in uniforms, all zeroed.
    pub fn with_builtins() -> Self {
        let mut table = Self::default();
        table.set(builtin::SCREEN_WIDTH, UniformValue::Int(0));
        table.set(builtin::SCREEN_HEIGHT, UniformValue::Int(0));
        table.set(builtin::TIME, UniformValue::Float(0.0));
        table.set(builtin::DELTA_TIME, UniformValue::Float(0.0));
        table.set(builtin::FRAME, UniformValue::Int(0));
        table
    }

    /// Inserts `value` under `key`, overwriting an existing entry.
    ///
    /// No type validation happens here; see [`UniformValue`] for how a
    /// variant change plays out shader-side.
    pub fn set(&mut self, key: &str, value: UniformValue) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key.to_string(), value));
        }
    }

    /// Current value under `key`, or `None` if the key was never set.
    pub fn get(&self, key: &str) -> Option<UniformValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    /// Reads the value under `key`, applies `f`, and writes the result back.
    ///
    /// Equivalent to `set(key, f(get(key)))`. `f` receives `None` when the
    /// key was never set and must decide what to produce from that.
    pub fn apply<F>(&mut self, key: &str, f: F)
    where
        F: FnOnce(Option<UniformValue>) -> UniformValue,
    {
        let next = f(self.get(key));
        self.set(key, next);
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, UniformValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── built-ins ─────────────────────────────────────────────────────────

    #[test]
    fn builtins_are_installed_and_zeroed() {
        let table = UniformTable::with_builtins();
        assert_eq!(table.get(builtin::SCREEN_WIDTH), Some(UniformValue::Int(0)));
        assert_eq!(table.get(builtin::SCREEN_HEIGHT), Some(UniformValue::Int(0)));
        assert_eq!(table.get(builtin::TIME), Some(UniformValue::Float(0.0)));
        assert_eq!(table.get(builtin::DELTA_TIME), Some(UniformValue::Float(0.0)));
        assert_eq!(table.get(builtin::FRAME), Some(UniformValue::Int(0)));
    }

    #[test]
    fn builtins_come_first_in_iteration_order() {
        let mut table = UniformTable::with_builtins();
        table.set("speed", UniformValue::Float(2.0));
        let names: Vec<&str> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(
            names,
            vec!["screenWidth", "screenHeight", "time", "deltaTime", "frame", "speed"]
        );
    }

    // ── set / get ─────────────────────────────────────────────────────────

    #[test]
    fn set_then_get_round_trips() {
        let mut table = UniformTable::default();
        table.set("tint", UniformValue::Vec3([0.1, 0.2, 0.3]));
        assert_eq!(table.get("tint"), Some(UniformValue::Vec3([0.1, 0.2, 0.3])));
    }

    #[test]
    fn set_overwrites_in_place() {
        let mut table = UniformTable::default();
        table.set("a", UniformValue::Float(1.0));
        table.set("b", UniformValue::Float(2.0));
        table.set("a", UniformValue::Float(9.0));
        assert_eq!(table.get("a"), Some(UniformValue::Float(9.0)));
        // Overwrite must not reorder.
        let names: Vec<&str> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn get_unknown_key_is_none() {
        let table = UniformTable::with_builtins();
        assert_eq!(table.get("nope"), None);
    }

    // ── apply ─────────────────────────────────────────────────────────────

    #[test]
    fn apply_matches_set_of_get() {
        let mut a = UniformTable::with_builtins();
        let mut b = a.clone();

        let f = |v: Option<UniformValue>| match v {
            Some(UniformValue::Float(x)) => UniformValue::Float(x + 1.0),
            _ => UniformValue::Float(0.0),
        };

        a.apply("time", f);
        let manual = f(b.get("time"));
        b.set("time", manual);

        assert_eq!(a.get("time"), b.get("time"));
    }

    #[test]
    fn apply_on_unset_key_passes_none() {
        let mut table = UniformTable::default();
        table.apply("fresh", |v| {
            assert_eq!(v, None);
            UniformValue::Int(42)
        });
        assert_eq!(table.get("fresh"), Some(UniformValue::Int(42)));
    }
}
