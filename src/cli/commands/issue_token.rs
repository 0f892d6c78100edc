use anyhow::{Result, bail};
use model::entities::user;
use sea_orm::{Database, EntityTrait};

use crate::auth;

pub async fn issue_token(database_url: &str, user_id: i32) -> Result<()> {
    let db = Database::connect(database_url).await?;
    if user::Entity::find_by_id(user_id).one(&db).await?.is_none() {
        bail!("User {} does not exist", user_id);
    }

    println!("{}", auth::issue_token(&db, user_id).await?);
    Ok(())
}
