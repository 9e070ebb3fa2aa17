//! Schema fixtures shared by the unit tests.

use crate::config::Config;
use crate::dialect::Dialect;
use crate::generator::Generator;
use crate::model::{Column, Field, MethodsOption, ModelToPbConfig, Type};
use std::sync::Arc;

pub(crate) fn generator(dialect: Dialect) -> Generator {
    Generator::new(Config::default(), dialect)
}

pub(crate) fn generator_with(config: Config) -> Generator {
    Generator::new(config, Dialect::PostgreSQL)
}

pub(crate) fn field(name: &str, ty: &str, column: &str, not_null: bool) -> Field {
    let mut col = Column::new(column, "");
    col.not_null = not_null;
    Field::new(name, ty, col)
}

/// `users` table covering every protobuf bridge case.
pub(crate) fn users() -> Type {
    let mut ty = Type::new(
        "User",
        vec![
            field("UserID", "int64", "user_id", true),
            field("Name", "string", "name", true),
            field("Score", "float64", "score", true),
            field("Avatar", "[]byte", "avatar", false),
            field("CreatedAt", "time.Time", "created_at", true),
            field("Nickname", "sql.NullString", "nickname", false),
            field("DeletedAt", "mysql.NullTime", "deleted_at", false),
            field("Location", "geom.Point", "location", false),
        ],
    );
    ty.schema = "public".to_string();
    ty.primary_key_fields = vec![ty.fields[0].clone()];
    ty.primary_key = Some(ty.fields[0].clone());
    ty
}

pub(crate) fn option(ty: Type, service: &str, skips: &[&str]) -> MethodsOption {
    let mut option = MethodsOption::new(Arc::new(ty));
    option.sub = service.to_string();
    option.model_to_pb = true;
    option.model_to_pb_config = Some(ModelToPbConfig {
        import_service: service.to_string(),
        skip_fields: skips.iter().map(|s| s.to_string()).collect(),
    });
    option
}
