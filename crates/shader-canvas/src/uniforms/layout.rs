use super::{UniformTable, UniformValue};

/// One field of the generated uniform struct.
#[derive(Debug, Clone)]
struct Field {
    name: String,
    offset: usize,
    size: usize,
    wgsl_type: &'static str,
}

/// Byte layout of the canvas uniform buffer.
///
/// Computed once from the uniform table when the pipeline is built, then
/// fixed: the layout is what the compiled shader was declared against. Keys
/// inserted into the table afterwards still round-trip through the table but
/// have no slot here and never reach the GPU.
///
/// Offsets follow WGSL uniform address-space rules: scalars align to 4,
/// `vec2` to 8, `vec3`/`vec4` to 16, and the total size is rounded up to a
/// multiple of 16.
#[derive(Debug, Clone)]
pub struct UniformLayout {
    fields: Vec<Field>,
    size: usize,
}

fn align_up(offset: usize, align: usize) -> usize {
    (offset + align - 1) & !(align - 1)
}

impl UniformLayout {
    /// Computes the layout for the table's current entries, in table order.
    pub fn of(table: &UniformTable) -> Self {
        let mut fields = Vec::with_capacity(table.len());
        let mut cursor = 0usize;

        for (name, value) in table.iter() {
            let offset = align_up(cursor, value.align());
            fields.push(Field {
                name: name.to_string(),
                offset,
                size: value.size(),
                wgsl_type: value.wgsl_type(),
            });
            cursor = offset + value.size();
        }

        Self {
            fields,
            size: align_up(cursor.max(4), 16),
        }
    }

    /// Total buffer size in bytes (16-byte aligned, never zero).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether `key` has a slot in the compiled struct.
    pub fn declares(&self, key: &str) -> bool {
        self.fields.iter().any(|f| f.name == key)
    }

    /// Renders the WGSL struct declaration for this layout.
    ///
    /// Field order matches buffer order; WGSL derives the same offsets from
    /// the declaration that `pack` writes to, so no explicit `@align` /
    /// `@size` attributes are needed.
    pub fn wgsl_struct(&self, struct_name: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!("struct {struct_name} {{\n"));
        for field in &self.fields {
            out.push_str(&format!("    {}: {},\n", field.name, field.wgsl_type));
        }
        out.push_str("}\n");
        out
    }

    /// Packs the table's current values into a buffer matching this layout.
    ///
    /// Table keys without a slot are skipped. A value whose variant changed
    /// since the layout was computed no longer matches its slot size; its
    /// slot is left zeroed rather than corrupting neighbouring fields.
    pub fn pack(&self, table: &UniformTable) -> Vec<u8> {
        let mut out = vec![0u8; self.size];
        for field in &self.fields {
            let Some(value) = table.get(&field.name) else {
                continue;
            };
            if value.size() == field.size {
                value.write_bytes(&mut out, field.offset);
            }
        }
        out
    }
}
