//! 选课存储操作

use super::SeaOrmStorage;
use crate::entity::courses;
use crate::entity::enrollments::{ActiveModel, Column};
use crate::entity::prelude::*;
use crate::errors::{Result, TutorHubError};
use crate::models::enrollments::{
    entities::{Enrollment, EnrollmentStatus},
    requests::{EnrollmentListQuery, EnrollmentScope, UpdateEnrollmentRequest},
    responses::EnrollmentListResponse,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, QueryTrait, Set,
};

impl SeaOrmStorage {
    /// 创建选课记录
    pub async fn create_enrollment_impl(
        &self,
        student_id: i64,
        course_id: i64,
        status: EnrollmentStatus,
    ) -> Result<Enrollment> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            student_id: Set(student_id),
            course_id: Set(course_id),
            status: Set(status.to_string()),
            progress: Set(0),
            enrolled_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("创建选课失败: {e}")))?;

        Ok(result.into_enrollment())
    }

    pub async fn get_enrollment_by_id_impl(&self, id: i64) -> Result<Option<Enrollment>> {
        let result = Enrollments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询选课失败: {e}")))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    pub async fn get_enrollment_by_student_and_course_impl(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>> {
        let result = Enrollments::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::CourseId.eq(course_id))
            .one(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询选课失败: {e}")))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    /// 分页列出选课记录，按可见范围过滤
    pub async fn list_enrollments_with_pagination_impl(
        &self,
        query: EnrollmentListQuery,
    ) -> Result<EnrollmentListResponse> {
        let page = query.page.max(1) as u64;
        let size = query.page_size.clamp(1, 100) as u64;

        let mut select = Enrollments::find();

        match query.scope {
            EnrollmentScope::All => {}
            EnrollmentScope::Student(student_id) => {
                select = select.filter(Column::StudentId.eq(student_id));
            }
            EnrollmentScope::Tutor(tutor_id) => {
                let owned = Courses::find()
                    .select_only()
                    .column(courses::Column::Id)
                    .filter(courses::Column::TutorId.eq(tutor_id))
                    .into_query();
                select = select.filter(Column::CourseId.in_subquery(owned));
            }
        }

        if let Some(course_id) = query.course_id {
            select = select.filter(Column::CourseId.eq(course_id));
        }

        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        let paginator = select
            .order_by_desc(Column::EnrolledAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询选课总数失败: {e}")))?;

        let enrollments = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询选课列表失败: {e}")))?;

        Ok(EnrollmentListResponse::new(
            enrollments.into_iter().map(|m| m.into_enrollment()).collect(),
            page as i64,
            size as i64,
            total as i64,
        ))
    }

    pub async fn update_enrollment_impl(
        &self,
        id: i64,
        update: UpdateEnrollmentRequest,
    ) -> Result<Option<Enrollment>> {
        if self.get_enrollment_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        if let Some(progress) = update.progress {
            model.progress = Set(progress);
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("更新选课失败: {e}")))?;

        self.get_enrollment_by_id_impl(id).await
    }

    pub async fn delete_enrollment_impl(&self, id: i64) -> Result<bool> {
        let result = Enrollments::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("删除选课失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::requests::CreateCourseRequest;
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::users::new_user_request;

    #[tokio::test]
    async fn test_scope_filters_enrollments() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let tutor = storage.create_user(new_user_request("tutor1")).await.unwrap();
        let s1 = storage.create_user(new_user_request("student1")).await.unwrap();
        let s2 = storage.create_user(new_user_request("student2")).await.unwrap();

        let owned = storage
            .create_course(CreateCourseRequest {
                title: "Owned".into(),
                description: None,
                category_id: None,
                tutor_id: Some(tutor.id),
                status: None,
            })
            .await
            .unwrap();
        let other = storage
            .create_course(CreateCourseRequest {
                title: "Other".into(),
                description: None,
                category_id: None,
                tutor_id: None,
                status: None,
            })
            .await
            .unwrap();

        storage
            .create_enrollment(s1.id, owned.id, EnrollmentStatus::Active)
            .await
            .unwrap();
        storage
            .create_enrollment(s2.id, owned.id, EnrollmentStatus::Active)
            .await
            .unwrap();
        storage
            .create_enrollment(s1.id, other.id, EnrollmentStatus::Pending)
            .await
            .unwrap();

        // 同一学生重复选同一课程违反唯一约束
        assert!(
            storage
                .create_enrollment(s1.id, owned.id, EnrollmentStatus::Active)
                .await
                .is_err()
        );

        let list = |scope| EnrollmentListQuery {
            page: 1,
            page_size: 10,
            scope,
            ..Default::default()
        };

        let all = storage
            .list_enrollments_with_pagination(list(EnrollmentScope::All))
            .await
            .unwrap();
        assert_eq!(all.pagination.total, 3);

        let tutor_view = storage
            .list_enrollments_with_pagination(list(EnrollmentScope::Tutor(tutor.id)))
            .await
            .unwrap();
        assert_eq!(tutor_view.pagination.total, 2);

        let student_view = storage
            .list_enrollments_with_pagination(list(EnrollmentScope::Student(s2.id)))
            .await
            .unwrap();
        assert_eq!(student_view.pagination.total, 1);
        assert_eq!(student_view.items[0].student_id, s2.id);
    }
}
