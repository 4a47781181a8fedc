//! Correlation scopes visible while converting the right side of a Correlate

use crate::error::{ConvertError, ConvertResult};
use rp_plan::CorrelationId;

/// One enclosing Correlate: its id, the alias its left row carries in the
/// generated SQL, and the fields that alias exposes.
#[derive(Debug, Clone)]
pub struct CorrelationFrame {
    pub id: CorrelationId,
    /// Rendered relation alias, e.g. `"$cor0"`
    pub alias: String,
    /// `(declared field name, column name exposed under the alias)`
    pub fields: Vec<(String, String)>,
}

/// Stack of correlation frames, innermost last
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<CorrelationFrame>,
}

impl ScopeStack {
    pub fn push(&mut self, frame: CorrelationFrame) {
        log::trace!(
            "Entering correlation scope {} as {} (depth {})",
            frame.id,
            frame.alias,
            self.frames.len() + 1
        );
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<CorrelationFrame> {
        let frame = self.frames.pop();
        if frame.is_none() {
            log::warn!("Attempted to pop correlation scope from empty stack");
        }
        frame
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Resolve `id.field` to `(alias, exposed column)`, innermost frame first
    pub fn resolve(
        &self,
        id: &CorrelationId,
        field: &str,
        node: &str,
    ) -> ConvertResult<(&str, &str)> {
        let frame = self
            .frames
            .iter()
            .rev()
            .find(|frame| &frame.id == id)
            .ok_or_else(|| {
                ConvertError::structural(
                    node,
                    format!(
                        "correlation id {id} is not in scope (visible: [{}])",
                        self.frames
                            .iter()
                            .map(|f| f.id.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                )
            })?;
        frame
            .fields
            .iter()
            .find(|(declared, _)| declared == field)
            .map(|(_, exposed)| (frame.alias.as_str(), exposed.as_str()))
            .ok_or_else(|| {
                ConvertError::structural(
                    node,
                    format!("correlation {id} has no field {field}"),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(id: &str, alias: &str) -> CorrelationFrame {
        CorrelationFrame {
            id: CorrelationId::new(id),
            alias: format!("\"{alias}\""),
            fields: vec![("icol".into(), "icol".into()), ("$f1".into(), "$F1".into())],
        }
    }

    #[test]
    fn test_resolve_innermost_first() {
        let mut scopes = ScopeStack::default();
        scopes.push(frame("$cor0", "$cor0"));
        scopes.push(frame("$cor0", "$cor1"));
        let (alias, column) = scopes
            .resolve(&CorrelationId::new("$cor0"), "$f1", "Filter")
            .unwrap();
        assert_eq!(alias, "\"$cor1\"");
        assert_eq!(column, "$F1");
        scopes.pop();
        let (alias, _) = scopes
            .resolve(&CorrelationId::new("$cor0"), "icol", "Filter")
            .unwrap();
        assert_eq!(alias, "\"$cor0\"");
    }

    #[test]
    fn test_unknown_id_and_field() {
        let mut scopes = ScopeStack::default();
        assert!(matches!(
            scopes.resolve(&CorrelationId::new("$cor0"), "icol", "Project"),
            Err(ConvertError::StructuralError { .. })
        ));
        scopes.push(frame("$cor0", "$cor0"));
        let err = scopes
            .resolve(&CorrelationId::new("$cor0"), "missing", "Project")
            .unwrap_err();
        assert!(err.to_string().contains("has no field missing"));
        assert_eq!(scopes.depth(), 1);
    }
}
