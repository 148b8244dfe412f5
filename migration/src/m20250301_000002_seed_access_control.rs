use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 系统内置角色（名称与 src/models/roles/entities.rs 中的 SYSTEM_ROLES 保持一致）
const SYSTEM_ROLES: [(&str, &str); 5] = [
    ("super_admin", "超级管理员，拥有全部权限"),
    ("admin", "平台管理员"),
    ("tutor", "导师，管理自己的课程和选课"),
    ("student", "学生"),
    ("parent", "家长，查看孩子的学习情况"),
];

const DEFAULT_PERMISSIONS: [(&str, &str); 12] = [
    ("users.read", "查看用户"),
    ("users.manage", "管理用户"),
    ("roles.manage", "管理角色与权限"),
    ("courses.read", "查看课程"),
    ("courses.manage", "创建和编辑课程"),
    ("enrollments.read", "查看选课记录"),
    ("enrollments.manage", "管理选课记录"),
    ("addresses.manage", "管理自己的地址"),
    ("files.upload", "上传文件"),
    ("files.manage", "管理所有文件"),
    ("dashboard.view", "查看管理后台统计"),
    ("notifications.send", "发送通知邮件"),
];

/// 非管理员角色的默认授权
const ROLE_GRANTS: [(&str, &[&str]); 3] = [
    (
        "tutor",
        &[
            "courses.read",
            "courses.manage",
            "enrollments.read",
            "enrollments.manage",
            "addresses.manage",
            "files.upload",
        ],
    ),
    (
        "student",
        &[
            "courses.read",
            "enrollments.read",
            "addresses.manage",
            "files.upload",
        ],
    ),
    (
        "parent",
        &["courses.read", "enrollments.read", "addresses.manage"],
    ),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| DbErr::Custom(e.to_string()))?
            .as_secs() as i64;

        for (name, description) in SYSTEM_ROLES {
            let insert = Query::insert()
                .into_table(Roles::Table)
                .columns([
                    Roles::Name,
                    Roles::Description,
                    Roles::CreatedAt,
                    Roles::UpdatedAt,
                ])
                .values_panic([name.into(), description.into(), now.into(), now.into()])
                .to_owned();

            manager.exec_stmt(insert).await?;
        }

        for (code, description) in DEFAULT_PERMISSIONS {
            let insert = Query::insert()
                .into_table(Permissions::Table)
                .columns([
                    Permissions::Code,
                    Permissions::Description,
                    Permissions::CreatedAt,
                ])
                .values_panic([code.into(), description.into(), now.into()])
                .to_owned();

            manager.exec_stmt(insert).await?;
        }

        // 管理员角色获得全部权限
        let all_codes: Vec<&str> = DEFAULT_PERMISSIONS.iter().map(|(code, _)| *code).collect();
        for role in ["super_admin", "admin"] {
            grant(manager, role, &all_codes, now).await?;
        }

        for (role, codes) in ROLE_GRANTS {
            grant(manager, role, codes, now).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(Query::delete().from_table(RolePermissions::Table).to_owned())
            .await?;
        manager
            .exec_stmt(Query::delete().from_table(Permissions::Table).to_owned())
            .await?;

        let names: Vec<&str> = SYSTEM_ROLES.iter().map(|(name, _)| *name).collect();
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Roles::Table)
                    .and_where(Expr::col(Roles::Name).is_in(names))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

/// INSERT INTO role_permissions SELECT roles.id, permissions.id, now FROM roles, permissions WHERE ...
async fn grant(
    manager: &SchemaManager<'_>,
    role: &str,
    codes: &[&str],
    now: i64,
) -> Result<(), DbErr> {
    let select = Query::select()
        .column((Roles::Table, Roles::Id))
        .column((Permissions::Table, Permissions::Id))
        .expr(Expr::value(now))
        .from(Roles::Table)
        .from(Permissions::Table)
        .and_where(Expr::col((Roles::Table, Roles::Name)).eq(role))
        .and_where(Expr::col((Permissions::Table, Permissions::Code)).is_in(codes.to_vec()))
        .to_owned();

    let insert = Query::insert()
        .into_table(RolePermissions::Table)
        .columns([
            RolePermissions::RoleId,
            RolePermissions::PermissionId,
            RolePermissions::GrantedAt,
        ])
        .select_from(select)
        .map_err(|e| DbErr::Custom(format!("构建授权语句失败: {e}")))?
        .to_owned();

    manager.exec_stmt(insert).await
}

#[derive(DeriveIden)]
enum Roles {
    #[sea_orm(iden = "roles")]
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Permissions {
    #[sea_orm(iden = "permissions")]
    Table,
    Id,
    Code,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum RolePermissions {
    #[sea_orm(iden = "role_permissions")]
    Table,
    RoleId,
    PermissionId,
    GrantedAt,
}
