//! 班级、科目与作业的存储操作

use super::{SeaOrmStorage, map_create_error};
use crate::entity::prelude::{
    AssignmentActiveModel, Assignments, ClassActiveModel, Classes, SubjectActiveModel,
};
use crate::entity::{assignments, classes};
use crate::errors::{ElearningError, Result};
use crate::models::{
    assignments::entities::{Assignment, NewAssignment},
    classes::entities::{Class, NewClass},
    subjects::entities::{NewSubject, Subject},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 创建班级，班主任不存在时返回完整性错误
    pub async fn create_class_impl(&self, req: NewClass) -> Result<Class> {
        let now = chrono::Utc::now().timestamp();

        let model = ClassActiveModel {
            name: Set(req.name),
            grade_level: Set(req.grade_level),
            teacher_id: Set(req.teacher_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            map_create_error(e, "class", ElearningError::validation("Class already exists"))
        })?;

        Ok(result.into_class())
    }

    pub async fn list_classes_by_teacher_impl(&self, teacher_id: i64) -> Result<Vec<Class>> {
        let result = Classes::find()
            .filter(classes::Column::TeacherId.eq(teacher_id))
            .order_by_asc(classes::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ElearningError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_class()).collect())
    }

    /// 创建科目
    pub async fn create_subject_impl(&self, req: NewSubject) -> Result<Subject> {
        let now = chrono::Utc::now().timestamp();

        let model = SubjectActiveModel {
            name: Set(req.name),
            description: Set(req.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            map_create_error(e, "subject", ElearningError::validation("Subject name already exists"))
        })?;

        Ok(result.into_subject())
    }

    /// 创建作业，科目或班级不存在时返回完整性错误
    pub async fn create_assignment_impl(&self, req: NewAssignment) -> Result<Assignment> {
        let now = chrono::Utc::now().timestamp();

        let model = AssignmentActiveModel {
            subject_id: Set(req.subject_id),
            class_id: Set(req.class_id),
            title: Set(req.title),
            description: Set(req.description),
            deadline: Set(req.deadline.timestamp()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            map_create_error(e, "assignment", ElearningError::validation("Assignment already exists"))
        })?;

        Ok(result.into_assignment())
    }

    pub async fn get_assignment_by_id_impl(&self, id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ElearningError::database_operation(format!("查询作业失败: {e}")))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 班级作业列表，可按科目筛选；截止时间倒序，相同时按 ID 倒序
    pub async fn list_assignments_by_class_impl(
        &self,
        class_id: i64,
        subject_id: Option<i64>,
    ) -> Result<Vec<Assignment>> {
        let mut select = Assignments::find().filter(assignments::Column::ClassId.eq(class_id));

        if let Some(subject_id) = subject_id {
            select = select.filter(assignments::Column::SubjectId.eq(subject_id));
        }

        let result = select
            .order_by_desc(assignments::Column::Deadline)
            .order_by_desc(assignments::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ElearningError::database_operation(format!("查询作业列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_assignment()).collect())
    }

    pub async fn list_assignments_by_subject_impl(
        &self,
        subject_id: i64,
    ) -> Result<Vec<Assignment>> {
        let result = Assignments::find()
            .filter(assignments::Column::SubjectId.eq(subject_id))
            .order_by_desc(assignments::Column::Deadline)
            .order_by_desc(assignments::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ElearningError::database_operation(format!("查询作业列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_assignment()).collect())
    }
}
