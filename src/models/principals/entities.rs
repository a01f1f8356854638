use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 角色：封闭的四种取值
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "principal.ts")]
pub enum Role {
    SuperAdmin, // 超级管理员
    Admin,      // 管理员
    Teacher,    // 教师
    Student,    // 学生
}

impl Role {
    pub const SUPER_ADMIN: &'static str = "super_admin";
    pub const ADMIN: &'static str = "admin";
    pub const TEACHER: &'static str = "teacher";
    pub const STUDENT: &'static str = "student";

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => Self::SUPER_ADMIN,
            Role::Admin => Self::ADMIN,
            Role::Teacher => Self::TEACHER,
            Role::Student => Self::STUDENT,
        }
    }

    pub fn admin_roles() -> &'static [Role] {
        &[Role::SuperAdmin, Role::Admin]
    }

    pub fn all_roles() -> &'static [Role] {
        &[Role::SuperAdmin, Role::Admin, Role::Teacher, Role::Student]
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Role>().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Role::SUPER_ADMIN => Ok(Role::SuperAdmin),
            Role::ADMIN => Ok(Role::Admin),
            Role::TEACHER => Ok(Role::Teacher),
            Role::STUDENT => Ok(Role::Student),
            _ => Err(format!(
                "Invalid role: '{s}'. Supported roles: super_admin, admin, teacher, student"
            )),
        }
    }
}

/// 令牌签发使用的身份投影
///
/// 三类账号（管理员、教师、学生）各自通过 `From` 适配为这一个形状，
/// 身份服务只接受它。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "principal.ts")]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

// 管理员实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "principal.ts")]
pub struct Admin {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    #[ts(skip)]
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 教师实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "principal.ts")]
pub struct Teacher {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 学生实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "principal.ts")]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    pub phone: Option<String>,
    // 未分班时为空
    pub class_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Admin> for Identity {
    fn from(admin: &Admin) -> Self {
        Identity {
            id: admin.id,
            email: admin.email.clone(),
            role: admin.role,
        }
    }
}

impl From<&Teacher> for Identity {
    fn from(teacher: &Teacher) -> Self {
        Identity {
            id: teacher.id,
            email: teacher.email.clone(),
            role: Role::Teacher,
        }
    }
}

impl From<&Student> for Identity {
    fn from(student: &Student) -> Self {
        Identity {
            id: student.id,
            email: student.email.clone(),
            role: Role::Student,
        }
    }
}

/// 令牌中携带的身份声明，只在内存中存在，不落库
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    pub subject_id: i64,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    // 受众即角色
    pub aud: String,
    pub iss: String,
}

impl IdentityClaims {
    pub fn issued_at(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::<chrono::Utc>::from_timestamp(self.iat, 0).unwrap_or_default()
    }

    pub fn expires_at(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::<chrono::Utc>::from_timestamp(self.exp, 0).unwrap_or_default()
    }
}

/// 登录时区分账号类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    Admin,
    Teacher,
    Student,
}

impl std::fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrincipalKind::Admin => write!(f, "admin"),
            PrincipalKind::Teacher => write!(f, "teacher"),
            PrincipalKind::Student => write!(f, "student"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_strings() {
        for role in Role::all_roles() {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), *role);
        }
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert!("guru".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }

    #[test]
    fn test_role_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            "\"super_admin\""
        );
    }

    #[test]
    fn test_identity_adapters() {
        let now = chrono::Utc::now();
        let student = Student {
            id: 9,
            name: "Sari".into(),
            email: "sari@school.test".into(),
            password_hash: String::new(),
            phone: None,
            class_id: Some(2),
            created_at: now,
            updated_at: now,
        };
        let identity = Identity::from(&student);
        assert_eq!(identity.id, 9);
        assert_eq!(identity.role, Role::Student);

        let admin = Admin {
            id: 1,
            name: "Root".into(),
            email: "root@school.test".into(),
            password_hash: String::new(),
            role: Role::SuperAdmin,
            phone: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(Identity::from(&admin).role, Role::SuperAdmin);
    }
}
