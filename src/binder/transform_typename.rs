use crate::ast::TypeNameAst;
use crate::core::data_type::{
    DECIMAL_PRECISION_DEFAULT, DECIMAL_PRECISION_MAX, DECIMAL_PRECISION_MIN,
    DECIMAL_SCALE_DEFAULT, LogicalType, TypeId, VARCHAR_SIZE_DEFAULT, lookup_type_name,
};
use crate::core::error::EngineError;

/// Resolves a parsed type name to a [`LogicalType`], applying and
/// validating any width / precision modifiers.
pub fn transform_type_name(ast: &TypeNameAst) -> Result<LogicalType, EngineError> {
    let (id, default_width) = lookup_type_name(&ast.name)?;
    match id {
        TypeId::Varchar | TypeId::Char => bind_string_type(ast, id, default_width),
        TypeId::Decimal => bind_decimal_type(ast),
        _ => {
            if !ast.modifiers.is_empty() {
                return Err(EngineError::Binder(format!(
                    "type {} does not take modifiers",
                    ast.name
                )));
            }
            let mut ty = LogicalType::new(id, default_width);
            if id == TypeId::Timestamp {
                // microsecond precision is the only one supported
                ty.precision = 6;
            }
            Ok(ty)
        }
    }
}

fn bind_string_type(
    ast: &TypeNameAst,
    id: TypeId,
    default_width: u32,
) -> Result<LogicalType, EngineError> {
    match ast.modifiers.as_slice() {
        [] => Ok(LogicalType::new(id, default_width)),
        [width] => {
            if *width <= 0 {
                return Err(EngineError::Parser(format!(
                    "invalid length for type {}: {width}",
                    ast.name
                )));
            }
            if *width > i64::from(VARCHAR_SIZE_DEFAULT) {
                return Err(EngineError::Parser(format!(
                    "length {width} for type {} exceeds maximum {VARCHAR_SIZE_DEFAULT}",
                    ast.name
                )));
            }
            Ok(LogicalType::new(id, *width as u32))
        }
        _ => Err(EngineError::Parser(format!(
            "type {} takes at most one modifier",
            ast.name
        ))),
    }
}

fn bind_decimal_type(ast: &TypeNameAst) -> Result<LogicalType, EngineError> {
    let (precision, scale) = match ast.modifiers.as_slice() {
        [] => (
            i64::from(DECIMAL_PRECISION_DEFAULT),
            i64::from(DECIMAL_SCALE_DEFAULT),
        ),
        [p] => (*p, 0),
        [p, s] => (*p, *s),
        _ => {
            return Err(EngineError::Parser(
                "decimal takes at most two modifiers".into(),
            ));
        }
    };
    if precision < i64::from(DECIMAL_PRECISION_MIN) || precision > i64::from(DECIMAL_PRECISION_MAX)
    {
        return Err(EngineError::Parser(format!(
            "decimal precision {precision} out of range [{DECIMAL_PRECISION_MIN}, {DECIMAL_PRECISION_MAX}]"
        )));
    }
    if scale < 0 || scale > precision {
        return Err(EngineError::Parser(format!(
            "decimal scale {scale} out of range [0, {precision}]"
        )));
    }
    Ok(LogicalType::decimal(precision as u8, scale as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_varchar_and_bounded_varchar() {
        let bare = transform_type_name(&TypeNameAst::plain("varchar")).unwrap();
        assert_eq!(bare.width, VARCHAR_SIZE_DEFAULT);
        let bounded =
            transform_type_name(&TypeNameAst::with_modifiers("varchar", vec![20])).unwrap();
        assert_eq!(bounded.width, 20);
    }

    #[test]
    fn varchar_rejects_bad_widths() {
        assert!(transform_type_name(&TypeNameAst::with_modifiers("varchar", vec![0])).is_err());
        assert!(transform_type_name(&TypeNameAst::with_modifiers("varchar", vec![-5])).is_err());
        assert!(
            transform_type_name(&TypeNameAst::with_modifiers(
                "varchar",
                vec![i64::from(VARCHAR_SIZE_DEFAULT) + 1]
            ))
            .is_err()
        );
        assert!(transform_type_name(&TypeNameAst::with_modifiers("varchar", vec![1, 2])).is_err());
    }

    #[test]
    fn decimal_defaults_and_explicit_scale() {
        let bare = transform_type_name(&TypeNameAst::plain("decimal")).unwrap();
        assert_eq!(
            (bare.precision, bare.scale),
            (DECIMAL_PRECISION_DEFAULT, DECIMAL_SCALE_DEFAULT)
        );
        let explicit =
            transform_type_name(&TypeNameAst::with_modifiers("numeric", vec![10, 2])).unwrap();
        assert_eq!((explicit.precision, explicit.scale), (10, 2));
    }

    #[test]
    fn decimal_rejects_bad_precision_and_scale() {
        assert!(transform_type_name(&TypeNameAst::with_modifiers("decimal", vec![0])).is_err());
        assert!(transform_type_name(&TypeNameAst::with_modifiers("decimal", vec![39])).is_err());
        assert!(transform_type_name(&TypeNameAst::with_modifiers("decimal", vec![5, 6])).is_err());
        assert!(transform_type_name(&TypeNameAst::with_modifiers("decimal", vec![5, -1])).is_err());
    }

    #[test]
    fn plain_types_reject_modifiers() {
        assert!(transform_type_name(&TypeNameAst::with_modifiers("int", vec![11])).is_err());
        assert!(transform_type_name(&TypeNameAst::with_modifiers("bool", vec![1])).is_err());
    }

    #[test]
    fn timestamp_carries_micro_precision() {
        let ty = transform_type_name(&TypeNameAst::plain("timestamp")).unwrap();
        assert_eq!(ty.precision, 6);
    }
}
