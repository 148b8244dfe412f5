//! 管理后台统计

use std::collections::BTreeMap;

use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{courses, enrollments, roles, user_roles, users};
use crate::errors::{Result, TutorHubError};
use crate::models::{admin::responses::DashboardStats, users::entities::UserStatus};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

const RECENT_USERS: u64 = 5;

impl SeaOrmStorage {
    pub async fn get_dashboard_stats_impl(&self) -> Result<DashboardStats> {
        let users_by_status: BTreeMap<String, i64> = Users::find()
            .select_only()
            .column(users::Column::Status)
            .column_as(users::Column::Id.count(), "count")
            .filter(users::Column::DeletedAt.is_null())
            .group_by(users::Column::Status)
            .into_tuple::<(String, i64)>()
            .all(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("统计用户失败: {e}")))?
            .into_iter()
            .collect();

        let users_by_role: BTreeMap<String, i64> = UserRoles::find()
            .select_only()
            .column(roles::Column::Name)
            .column_as(user_roles::Column::Id.count(), "count")
            .inner_join(Roles)
            .inner_join(Users)
            .filter(users::Column::DeletedAt.is_null())
            .group_by(roles::Column::Name)
            .into_tuple::<(String, i64)>()
            .all(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("统计角色用户失败: {e}")))?
            .into_iter()
            .collect();

        let courses_by_status: BTreeMap<String, i64> = Courses::find()
            .select_only()
            .column(courses::Column::Status)
            .column_as(courses::Column::Id.count(), "count")
            .filter(courses::Column::DeletedAt.is_null())
            .group_by(courses::Column::Status)
            .into_tuple::<(String, i64)>()
            .all(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("统计课程失败: {e}")))?
            .into_iter()
            .collect();

        let enrollments_by_status: BTreeMap<String, i64> = Enrollments::find()
            .select_only()
            .column(enrollments::Column::Status)
            .column_as(enrollments::Column::Id.count(), "count")
            .group_by(enrollments::Column::Status)
            .into_tuple::<(String, i64)>()
            .all(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("统计选课失败: {e}")))?
            .into_iter()
            .collect();

        let recent = Users::find()
            .filter(users::Column::DeletedAt.is_null())
            .order_by_desc(users::Column::CreatedAt)
            .order_by_desc(users::Column::Id)
            .limit(RECENT_USERS)
            .all(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询最近用户失败: {e}")))?;
        let recent_users = self.hydrate_users(recent).await?;

        Ok(DashboardStats {
            total_users: users_by_status.values().sum(),
            active_users: users_by_status
                .get(UserStatus::Active.as_str())
                .copied()
                .unwrap_or(0),
            users_by_role,
            total_courses: courses_by_status.values().sum(),
            courses_by_status,
            total_enrollments: enrollments_by_status.values().sum(),
            enrollments_by_status,
            recent_users,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::{entities::CourseStatus, requests::CreateCourseRequest};
    use crate::models::enrollments::entities::EnrollmentStatus;
    use crate::models::users::requests::UpdateUserRequest;
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::users::new_user_request;

    #[tokio::test]
    async fn test_dashboard_counts() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let mut users = Vec::new();
        for i in 0..7 {
            users.push(
                storage
                    .create_user(new_user_request(&format!("member{i}")))
                    .await
                    .unwrap(),
            );
        }
        storage
            .update_user(
                users[0].id,
                UpdateUserRequest {
                    status: Some(UserStatus::Suspended),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        storage.delete_user(users[1].id).await.unwrap();

        let course = storage
            .create_course(CreateCourseRequest {
                title: "Stats".into(),
                description: None,
                category_id: None,
                tutor_id: None,
                status: Some(CourseStatus::Published),
            })
            .await
            .unwrap();
        storage
            .create_enrollment(users[2].id, course.id, EnrollmentStatus::Active)
            .await
            .unwrap();

        let stats = storage.get_dashboard_stats().await.unwrap();
        assert_eq!(stats.total_users, 6);
        assert_eq!(stats.active_users, 5);
        assert_eq!(stats.users_by_role.get("student"), Some(&6));
        assert_eq!(stats.courses_by_status.get("published"), Some(&1));
        assert_eq!(stats.total_enrollments, 1);
        assert_eq!(stats.recent_users.len(), 5);
        assert!(stats.recent_users.iter().all(|u| u.id != users[1].id));
    }
}
