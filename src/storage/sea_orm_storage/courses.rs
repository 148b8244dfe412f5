//! 课程、分类、章节与课时存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::prelude::*;
use crate::entity::{categories, course_modules, courses, lessons};
use crate::errors::{Result, TutorHubError};
use crate::models::courses::{
    entities::{Category, Course, CourseModule, CourseStatus, Lesson},
    requests::{
        CourseListQuery, CreateCategoryRequest, CreateCourseRequest, CreateLessonRequest,
        CreateModuleRequest, UpdateCategoryRequest, UpdateCourseRequest, UpdateLessonRequest,
        UpdateModuleRequest,
    },
    responses::{CourseDetailResponse, CourseListResponse, ModuleWithLessons},
};
use crate::utils::like_contains;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    // ==================== 分类 ====================

    pub async fn create_category_impl(&self, req: CreateCategoryRequest) -> Result<Category> {
        let now = chrono::Utc::now().timestamp();

        let model = CategoryActiveModel {
            name: Set(req.name),
            description: Set(req.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("创建分类失败: {e}")))?;

        Ok(result.into_category())
    }

    pub async fn get_category_by_id_impl(&self, id: i64) -> Result<Option<Category>> {
        let result = Categories::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询分类失败: {e}")))?;

        Ok(result.map(|m| m.into_category()))
    }

    pub async fn get_category_by_name_impl(&self, name: &str) -> Result<Option<Category>> {
        let result = Categories::find()
            .filter(categories::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询分类失败: {e}")))?;

        Ok(result.map(|m| m.into_category()))
    }

    pub async fn list_categories_impl(&self) -> Result<Vec<Category>> {
        let result = Categories::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询分类列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_category()).collect())
    }

    pub async fn update_category_impl(
        &self,
        id: i64,
        update: UpdateCategoryRequest,
    ) -> Result<Option<Category>> {
        if self.get_category_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = CategoryActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }

        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("更新分类失败: {e}")))?;

        self.get_category_by_id_impl(id).await
    }

    /// 删除分类，引用它的课程 category_id 置空
    pub async fn delete_category_impl(&self, id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("开启事务失败: {e}")))?;

        Courses::update_many()
            .col_expr(
                courses::Column::CategoryId,
                sea_orm::sea_query::Expr::value(Option::<i64>::None),
            )
            .filter(courses::Column::CategoryId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("解除课程分类失败: {e}")))?;

        let result = Categories::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("删除分类失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    // ==================== 课程 ====================

    pub async fn create_course_impl(&self, req: CreateCourseRequest) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();

        let model = CourseActiveModel {
            title: Set(req.title),
            description: Set(req.description),
            category_id: Set(req.category_id),
            tutor_id: Set(req.tutor_id),
            status: Set(req.status.unwrap_or(CourseStatus::Draft).to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("创建课程失败: {e}")))?;

        Ok(result.into_course())
    }

    pub async fn get_course_by_id_impl(&self, id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(id)
            .filter(courses::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 课程详情（章节及课时按 position 排序）
    pub async fn get_course_detail_impl(&self, id: i64) -> Result<Option<CourseDetailResponse>> {
        let Some(course) = self.get_course_by_id_impl(id).await? else {
            return Ok(None);
        };

        let modules = self.list_modules_impl(id).await?;
        let module_ids: Vec<i64> = modules.iter().map(|m| m.id).collect();

        let mut lessons_by_module: HashMap<i64, Vec<Lesson>> = HashMap::new();
        if !module_ids.is_empty() {
            let rows = Lessons::find()
                .filter(lessons::Column::ModuleId.is_in(module_ids))
                .order_by_asc(lessons::Column::Position)
                .order_by_asc(lessons::Column::Id)
                .all(&self.db)
                .await
                .map_err(|e| TutorHubError::database_operation(format!("查询课时失败: {e}")))?;

            for row in rows {
                lessons_by_module
                    .entry(row.module_id)
                    .or_default()
                    .push(row.into_lesson());
            }
        }

        let modules = modules
            .into_iter()
            .map(|module| ModuleWithLessons {
                lessons: lessons_by_module.remove(&module.id).unwrap_or_default(),
                module,
            })
            .collect();

        Ok(Some(CourseDetailResponse { course, modules }))
    }

    /// 分页列出课程
    pub async fn list_courses_with_pagination_impl(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        let page = query.page.max(1) as u64;
        let size = query.page_size.clamp(1, 100) as u64;

        let mut select = Courses::find().filter(courses::Column::DeletedAt.is_null());

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let search = search.trim();
            select = select.filter(
                Condition::any()
                    .add(courses::Column::Title.like(like_contains(search)))
                    .add(courses::Column::Description.like(like_contains(search))),
            );
        }

        if let Some(status) = query.status {
            select = select.filter(courses::Column::Status.eq(status.as_str()));
        }

        if let Some(category_id) = query.category_id {
            select = select.filter(courses::Column::CategoryId.eq(category_id));
        }

        if let Some(tutor_id) = query.tutor_id {
            select = select.filter(courses::Column::TutorId.eq(tutor_id));
        }

        let paginator = select
            .order_by_desc(courses::Column::CreatedAt)
            .order_by_desc(courses::Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询课程总数失败: {e}")))?;

        let courses = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询课程列表失败: {e}")))?;

        Ok(CourseListResponse::new(
            courses.into_iter().map(|m| m.into_course()).collect(),
            page as i64,
            size as i64,
            total as i64,
        ))
    }

    pub async fn update_course_impl(
        &self,
        id: i64,
        update: UpdateCourseRequest,
    ) -> Result<Option<Course>> {
        if self.get_course_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = CourseActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(title) = update.title {
            model.title = Set(title);
        }

        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        if let Some(category_id) = update.category_id {
            model.category_id = Set(Some(category_id));
        }

        if let Some(tutor_id) = update.tutor_id {
            model.tutor_id = Set(Some(tutor_id));
        }

        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("更新课程失败: {e}")))?;

        self.get_course_by_id_impl(id).await
    }

    /// 软删除课程
    pub async fn delete_course_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Courses::update_many()
            .col_expr(courses::Column::DeletedAt, sea_orm::sea_query::Expr::value(now))
            .col_expr(courses::Column::UpdatedAt, sea_orm::sea_query::Expr::value(now))
            .filter(courses::Column::Id.eq(id))
            .filter(courses::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("删除课程失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    // ==================== 章节 ====================

    pub async fn create_module_impl(
        &self,
        course_id: i64,
        req: CreateModuleRequest,
    ) -> Result<CourseModule> {
        let now = chrono::Utc::now().timestamp();

        let model = CourseModuleActiveModel {
            course_id: Set(course_id),
            title: Set(req.title),
            description: Set(req.description),
            position: Set(req.position.unwrap_or(0)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("创建章节失败: {e}")))?;

        Ok(result.into_module())
    }

    pub async fn get_module_by_id_impl(&self, id: i64) -> Result<Option<CourseModule>> {
        let result = CourseModules::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询章节失败: {e}")))?;

        Ok(result.map(|m| m.into_module()))
    }

    pub async fn list_modules_impl(&self, course_id: i64) -> Result<Vec<CourseModule>> {
        let result = CourseModules::find()
            .filter(course_modules::Column::CourseId.eq(course_id))
            .order_by_asc(course_modules::Column::Position)
            .order_by_asc(course_modules::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询章节列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_module()).collect())
    }

    pub async fn update_module_impl(
        &self,
        id: i64,
        update: UpdateModuleRequest,
    ) -> Result<Option<CourseModule>> {
        if self.get_module_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = CourseModuleActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(title) = update.title {
            model.title = Set(title);
        }

        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        if let Some(position) = update.position {
            model.position = Set(position);
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("更新章节失败: {e}")))?;

        self.get_module_by_id_impl(id).await
    }

    /// 删除章节及其课时
    pub async fn delete_module_impl(&self, id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("开启事务失败: {e}")))?;

        Lessons::delete_many()
            .filter(lessons::Column::ModuleId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("删除课时失败: {e}")))?;

        let result = CourseModules::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("删除章节失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| TutorHubError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    // ==================== 课时 ====================

    pub async fn create_lesson_impl(
        &self,
        module_id: i64,
        req: CreateLessonRequest,
    ) -> Result<Lesson> {
        let now = chrono::Utc::now().timestamp();

        let model = LessonActiveModel {
            module_id: Set(module_id),
            title: Set(req.title),
            content: Set(req.content),
            position: Set(req.position.unwrap_or(0)),
            duration_minutes: Set(req.duration_minutes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("创建课时失败: {e}")))?;

        Ok(result.into_lesson())
    }

    pub async fn get_lesson_by_id_impl(&self, id: i64) -> Result<Option<Lesson>> {
        let result = Lessons::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询课时失败: {e}")))?;

        Ok(result.map(|m| m.into_lesson()))
    }

    pub async fn list_lessons_impl(&self, module_id: i64) -> Result<Vec<Lesson>> {
        let result = Lessons::find()
            .filter(lessons::Column::ModuleId.eq(module_id))
            .order_by_asc(lessons::Column::Position)
            .order_by_asc(lessons::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("查询课时列表失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_lesson()).collect())
    }

    pub async fn update_lesson_impl(
        &self,
        id: i64,
        update: UpdateLessonRequest,
    ) -> Result<Option<Lesson>> {
        if self.get_lesson_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = LessonActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(title) = update.title {
            model.title = Set(title);
        }

        if let Some(content) = update.content {
            model.content = Set(Some(content));
        }

        if let Some(position) = update.position {
            model.position = Set(position);
        }

        if let Some(duration) = update.duration_minutes {
            model.duration_minutes = Set(Some(duration));
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("更新课时失败: {e}")))?;

        self.get_lesson_by_id_impl(id).await
    }

    pub async fn delete_lesson_impl(&self, id: i64) -> Result<bool> {
        let result = Lessons::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| TutorHubError::database_operation(format!("删除课时失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;

    fn course_request(title: &str, tutor_id: Option<i64>) -> CreateCourseRequest {
        CreateCourseRequest {
            title: title.to_string(),
            description: None,
            category_id: None,
            tutor_id,
            status: None,
        }
    }

    fn module_request(title: &str, position: i32) -> CreateModuleRequest {
        CreateModuleRequest {
            title: title.to_string(),
            description: None,
            position: Some(position),
        }
    }

    fn lesson_request(title: &str, position: i32) -> CreateLessonRequest {
        CreateLessonRequest {
            title: title.to_string(),
            content: None,
            position: Some(position),
            duration_minutes: Some(15),
        }
    }

    #[tokio::test]
    async fn test_course_detail_is_ordered_by_position() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let course = storage
            .create_course(course_request("Rust 101", None))
            .await
            .unwrap();
        assert_eq!(course.status, CourseStatus::Draft);

        let second = storage
            .create_module(course.id, module_request("Ownership", 2))
            .await
            .unwrap();
        let first = storage
            .create_module(course.id, module_request("Basics", 1))
            .await
            .unwrap();
        storage
            .create_lesson(first.id, lesson_request("Variables", 2))
            .await
            .unwrap();
        storage
            .create_lesson(first.id, lesson_request("Hello", 1))
            .await
            .unwrap();

        let detail = storage.get_course_detail(course.id).await.unwrap().unwrap();
        let titles: Vec<_> = detail.modules.iter().map(|m| m.module.title.as_str()).collect();
        assert_eq!(titles, vec!["Basics", "Ownership"]);
        let lessons: Vec<_> = detail.modules[0]
            .lessons
            .iter()
            .map(|l| l.title.as_str())
            .collect();
        assert_eq!(lessons, vec!["Hello", "Variables"]);
        assert!(detail.modules[1].lessons.is_empty());

        assert!(storage.delete_module(second.id).await.unwrap());
        assert!(storage.delete_module(first.id).await.unwrap());
        assert!(storage.list_lessons(first.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_soft_deleted_course_hidden_from_listing() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let kept = storage
            .create_course(course_request("Kept", None))
            .await
            .unwrap();
        let removed = storage
            .create_course(course_request("Removed", None))
            .await
            .unwrap();

        assert!(storage.delete_course(removed.id).await.unwrap());
        assert!(storage.get_course_by_id(removed.id).await.unwrap().is_none());

        let page = storage
            .list_courses_with_pagination(CourseListQuery {
                page: 1,
                page_size: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.items[0].id, kept.id);
    }

    #[tokio::test]
    async fn test_delete_category_detaches_courses() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let category = storage
            .create_category(CreateCategoryRequest {
                name: "Programming".into(),
                description: None,
            })
            .await
            .unwrap();
        let mut req = course_request("Go", None);
        req.category_id = Some(category.id);
        let course = storage.create_course(req).await.unwrap();

        assert!(storage.delete_category(category.id).await.unwrap());
        let course = storage.get_course_by_id(course.id).await.unwrap().unwrap();
        assert_eq!(course.category_id, None);
    }
}
