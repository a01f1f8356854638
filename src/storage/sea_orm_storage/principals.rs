//! 账号存储操作（管理员、教师、学生）

use super::{SeaOrmStorage, duplicate_email, map_create_error};
use crate::entity::prelude::{
    AdminActiveModel, Admins, StudentActiveModel, Students, TeacherActiveModel, Teachers,
};
use crate::entity::{admins, students, teachers};
use crate::errors::{ElearningError, Result};
use crate::models::principals::{
    entities::{Admin, Student, Teacher},
    requests::{NewAdmin, NewStudent, NewTeacher},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 创建管理员
    pub async fn create_admin_impl(&self, req: NewAdmin) -> Result<Admin> {
        let now = chrono::Utc::now().timestamp();

        let model = AdminActiveModel {
            name: Set(req.name),
            email: Set(req.email),
            password_hash: Set(req.password_hash),
            role: Set(req.role.to_string()),
            phone: Set(req.phone),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_create_error(e, "admin", duplicate_email()))?;

        result.into_admin()
    }

    pub async fn count_admins_impl(&self) -> Result<u64> {
        Admins::find()
            .count(&self.db)
            .await
            .map_err(|e| ElearningError::database_operation(format!("统计管理员失败: {e}")))
    }

    /// 通过邮箱获取管理员
    pub async fn get_admin_by_email_impl(&self, email: &str) -> Result<Option<Admin>> {
        let result = Admins::find()
            .filter(admins::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| ElearningError::database_operation(format!("查询管理员失败: {e}")))?;

        result.map(|m| m.into_admin()).transpose()
    }

    /// 创建教师
    pub async fn create_teacher_impl(&self, req: NewTeacher) -> Result<Teacher> {
        let now = chrono::Utc::now().timestamp();

        let model = TeacherActiveModel {
            name: Set(req.name),
            email: Set(req.email),
            password_hash: Set(req.password_hash),
            phone: Set(req.phone),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_create_error(e, "teacher", duplicate_email()))?;

        Ok(result.into_teacher())
    }

    pub async fn get_teacher_by_email_impl(&self, email: &str) -> Result<Option<Teacher>> {
        let result = Teachers::find()
            .filter(teachers::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| ElearningError::database_operation(format!("查询教师失败: {e}")))?;

        Ok(result.map(|m| m.into_teacher()))
    }

    /// 创建学生，班级不存在时返回完整性错误
    pub async fn create_student_impl(&self, req: NewStudent) -> Result<Student> {
        let now = chrono::Utc::now().timestamp();

        let model = StudentActiveModel {
            name: Set(req.name),
            email: Set(req.email),
            password_hash: Set(req.password_hash),
            phone: Set(req.phone),
            class_id: Set(req.class_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_create_error(e, "student", duplicate_email()))?;

        Ok(result.into_student())
    }

    pub async fn get_student_by_id_impl(&self, id: i64) -> Result<Option<Student>> {
        let result = Students::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ElearningError::database_operation(format!("查询学生失败: {e}")))?;

        Ok(result.map(|m| m.into_student()))
    }

    pub async fn get_student_by_email_impl(&self, email: &str) -> Result<Option<Student>> {
        let result = Students::find()
            .filter(students::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| ElearningError::database_operation(format!("查询学生失败: {e}")))?;

        Ok(result.map(|m| m.into_student()))
    }

    /// 列出若干班级中的学生
    pub async fn list_students_by_class_ids_impl(&self, class_ids: &[i64]) -> Result<Vec<Student>> {
        if class_ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Students::find()
            .filter(students::Column::ClassId.is_in(class_ids.iter().copied()))
            .order_by_asc(students::Column::Name)
            .order_by_asc(students::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ElearningError::database_operation(format!("查询学生列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_student()).collect())
    }
}
