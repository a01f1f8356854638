//! 管理员实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "admins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub phone: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 管理员表只允许两种管理员角色，其他值视为数据错误
    pub fn into_admin(self) -> crate::errors::Result<crate::models::principals::entities::Admin> {
        use crate::errors::ElearningError;
        use crate::models::principals::entities::{Admin, Role};

        let role = match self.role.parse::<Role>() {
            Ok(role @ (Role::SuperAdmin | Role::Admin)) => role,
            _ => {
                return Err(ElearningError::database_operation(format!(
                    "Invalid admin role '{}' for admin {}",
                    self.role, self.id
                )));
            }
        };

        Ok(Admin {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role,
            phone: self.phone,
            created_at: super::from_timestamp(self.created_at),
            updated_at: super::from_timestamp(self.updated_at),
        })
    }
}
