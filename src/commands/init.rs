//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::content::NewPost;
use crate::Anomia;

/// Initialize a new site in the given directory. Returns the generated admin
/// password.
pub async fn init_site(target_dir: &Path) -> Result<String> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("Site already initialized: {:?}", config_path);
    }

    fs::create_dir_all(target_dir)?;

    let password = Uuid::new_v4().simple().to_string();
    let config_content = format!(
        r#"# A Anomia configuration

# Site
title: A Anomia
description: Filosofia para o cotidiano
language: pt-BR

# Author identity used for every post
author: A Anomia
author_image: https://picsum.photos/seed/author/100/100

# Storage: json | memory | sqlite
storage:
  backend: json
  path: db.json

# Cover images
images:
  placeholder: https://picsum.photos/seed/:seed/1200/800
  default_hint: filosofia abstrata

# Admin login (ANOMIA_ADMIN_PASSWORD overrides the password)
admin:
  username: admin
  password: "{}"
  session_ttl_secs: 43200

# Generative drafting service
drafting:
  # endpoint: http://localhost:8080
  timeout_secs: 60

# Server
server:
  ip: localhost
  port: 4000
"#,
        password
    );

    fs::write(&config_path, config_content)?;

    // Create a sample post
    let anomia = Anomia::new(target_dir)?;
    let repo = anomia.open_repository()?;
    repo.create_post(NewPost {
        title: "Bem-vindo à Anomia".to_string(),
        subtitle: "Um primeiro post".to_string(),
        content: "Este é o primeiro post do blog. Edite-o ou apague-o e comece a escrever."
            .to_string(),
        tags: vec!["boas-vindas".to_string()],
        image_url: None,
        image_hint: anomia.config.images.default_hint.clone(),
    })
    .await?;

    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_writes_config_and_sample_post() {
        let dir = tempfile::tempdir().unwrap();
        let password = init_site(dir.path()).await.unwrap();

        let anomia = Anomia::new(dir.path()).unwrap();
        if std::env::var(crate::config::ADMIN_PASSWORD_ENV).is_err() {
            assert_eq!(anomia.config.admin.password, password);
        }
        let posts = anomia.open_repository().unwrap().list_posts().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].author, "A Anomia");

        assert!(init_site(dir.path()).await.is_err());
    }
}
