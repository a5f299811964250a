use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use super::navigation_service;
use crate::access::{AccessProfile, Permission};
use crate::database::models::{Article, ArticleDraft, ArticleStatus, ArticleUpdate};
use crate::database::TeamStore;
use crate::filter::{Filter, FilterData};
use crate::types::{slugify, unique_slug};

#[derive(Debug, Clone, Serialize)]
pub struct ArticlePage {
    /// Matches before paging.
    pub total: usize,
    pub items: Vec<Article>,
}

/// Result of purging an article.
#[derive(Debug, Clone, Serialize)]
pub struct Purged {
    pub article: Article,
    pub links_removed: usize,
}

/// Find articles; newest first unless the filter orders otherwise.
pub fn find(store: &TeamStore, profile: &AccessProfile, data: FilterData) -> ServiceResult<ArticlePage> {
    profile.require(Permission::ArticlesRead)?;

    let mut filter = Filter::new();
    filter.order(json!("created_at desc"))?;
    filter.assign(data)?;

    let total = filter.count(store.articles.values())?;
    let items = filter.apply(store.articles.values())?.into_iter().cloned().collect();
    Ok(ArticlePage { total, items })
}

/// By id or slug.
pub fn get(store: &TeamStore, profile: &AccessProfile, article_ref: &str) -> ServiceResult<Article> {
    profile.require(Permission::ArticlesRead)?;
    lookup(store, article_ref).cloned()
}

fn lookup<'a>(store: &'a TeamStore, article_ref: &str) -> ServiceResult<&'a Article> {
    let found = match Uuid::parse_str(article_ref) {
        Ok(id) => store.articles.get(&id),
        Err(_) => store.article_by_slug(article_ref),
    };
    found.ok_or_else(|| ServiceError::not_found(format!("Article {}", article_ref)))
}

fn lookup_mut<'a>(store: &'a mut TeamStore, id: Uuid) -> ServiceResult<&'a mut Article> {
    store
        .articles
        .get_mut(&id)
        .ok_or_else(|| ServiceError::not_found(format!("Article {}", id)))
}

fn check_title(title: &str) -> ServiceResult<String> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 200 {
        return Err(ServiceError::field("title", "Title must be 1 to 200 characters"));
    }
    Ok(title.to_string())
}

/// An explicit slug must be free; a derived one gets a numeric suffix.
fn pick_slug(store: &TeamStore, requested: Option<&str>, title: &str, own_id: Option<Uuid>) -> ServiceResult<String> {
    let taken = |candidate: &str| {
        store
            .article_by_slug(candidate)
            .is_some_and(|other| Some(other.id) != own_id)
    };
    match requested {
        Some(requested) => {
            let slug = slugify(requested);
            if slug.is_empty() {
                return Err(ServiceError::field("slug", "Slug needs at least one letter or digit"));
            }
            if taken(&slug) {
                return Err(ServiceError::conflict(format!("Slug {} is already used", slug)));
            }
            Ok(slug)
        }
        None => Ok(unique_slug(&slugify(title), taken)),
    }
}

pub fn create(store: &mut TeamStore, profile: &AccessProfile, draft: ArticleDraft) -> ServiceResult<Article> {
    profile.require(Permission::ArticlesCreate)?;
    let title = check_title(&draft.title)?;
    let slug = pick_slug(store, draft.slug.as_deref(), &title, None)?;

    let now = Utc::now();
    let article = Article {
        id: Uuid::new_v4(),
        title,
        slug,
        excerpt: draft.excerpt,
        body: draft.body,
        status: ArticleStatus::Draft,
        author_id: profile.user_id,
        published_at: None,
        created_at: now,
        updated_at: now,
        trashed_at: None,
    };
    store.articles.insert(article.id, article.clone());
    Ok(article)
}

/// Edit content. Changing the status this way needs `articles:publish` too.
pub fn update(store: &mut TeamStore, profile: &AccessProfile, id: Uuid, update: ArticleUpdate) -> ServiceResult<Article> {
    profile.require(Permission::ArticlesUpdate)?;
    if update.status.is_some() {
        profile.require(Permission::ArticlesPublish)?;
    }

    let current = lookup(store, &id.to_string())?;
    if current.is_trashed() {
        return Err(ServiceError::conflict("Restore the article before editing it"));
    }

    let title = update.title.as_deref().map(check_title).transpose()?;
    let slug = match update.slug.as_deref() {
        Some(requested) => Some(pick_slug(store, Some(requested), "", Some(id))?),
        None => None,
    };

    let article = lookup_mut(store, id)?;
    if let Some(title) = title {
        article.title = title;
    }
    if let Some(slug) = slug {
        article.slug = slug;
    }
    if let Some(excerpt) = update.excerpt {
        article.excerpt = excerpt;
    }
    if let Some(body) = update.body {
        article.body = body;
    }
    if let Some(status) = update.status {
        set_status(article, status);
    }
    article.updated_at = Utc::now();
    Ok(article.clone())
}

fn set_status(article: &mut Article, status: ArticleStatus) {
    article.status = status;
    match status {
        ArticleStatus::Published => {
            article.published_at.get_or_insert_with(Utc::now);
        }
        ArticleStatus::Draft => article.published_at = None,
        ArticleStatus::Archived => {}
    }
}

fn transition(
    store: &mut TeamStore,
    profile: &AccessProfile,
    id: Uuid,
    permission: Permission,
    change: impl FnOnce(&mut Article) -> ServiceResult<()>,
) -> ServiceResult<Article> {
    profile.require(permission)?;
    let article = lookup_mut(store, id)?;
    change(article)?;
    article.updated_at = Utc::now();
    Ok(article.clone())
}

pub fn publish(store: &mut TeamStore, profile: &AccessProfile, id: Uuid) -> ServiceResult<Article> {
    transition(store, profile, id, Permission::ArticlesPublish, |article| {
        if article.is_trashed() {
            return Err(ServiceError::conflict("Trashed articles cannot be published"));
        }
        set_status(article, ArticleStatus::Published);
        Ok(())
    })
}

pub fn unpublish(store: &mut TeamStore, profile: &AccessProfile, id: Uuid) -> ServiceResult<Article> {
    transition(store, profile, id, Permission::ArticlesPublish, |article| {
        set_status(article, ArticleStatus::Draft);
        Ok(())
    })
}

pub fn trash(store: &mut TeamStore, profile: &AccessProfile, id: Uuid) -> ServiceResult<Article> {
    transition(store, profile, id, Permission::ArticlesDelete, |article| {
        if article.is_trashed() {
            return Err(ServiceError::conflict("Article is already in the trash"));
        }
        article.trashed_at = Some(Utc::now());
        Ok(())
    })
}

pub fn restore(store: &mut TeamStore, profile: &AccessProfile, id: Uuid) -> ServiceResult<Article> {
    transition(store, profile, id, Permission::ArticlesDelete, |article| {
        if !article.is_trashed() {
            return Err(ServiceError::conflict("Article is not in the trash"));
        }
        article.trashed_at = None;
        Ok(())
    })
}

/// Delete a trashed article for good, along with navigation links to it.
pub fn purge(store: &mut TeamStore, profile: &AccessProfile, id: Uuid) -> ServiceResult<Purged> {
    profile.require(Permission::ArticlesDelete)?;
    if !lookup_mut(store, id)?.is_trashed() {
        return Err(ServiceError::conflict("Only trashed articles can be purged"));
    }

    let article = store
        .articles
        .remove(&id)
        .ok_or_else(|| ServiceError::not_found(format!("Article {}", id)))?;
    let links_removed = navigation_service::remove_article_links(store, id);
    tracing::info!("Purged article {} and {} navigation links", article.slug, links_removed);
    Ok(Purged {
        article,
        links_removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NavigationItem;
    use crate::services::navigation_service::{NewNavigationItem, Revised};
    use crate::testing::{self, EDITOR, VIEWER};
    use serde_json::json;

    fn draft(title: &str) -> ArticleDraft {
        ArticleDraft {
            title: title.to_string(),
            slug: None,
            excerpt: String::new(),
            body: json!({ "type": "doc", "content": [] }),
        }
    }

    #[test]
    fn create_derives_unique_slugs() {
        let mut store = testing::team();
        let editor = testing::profile(&store, EDITOR);

        let first = create(&mut store, &editor, draft("Hello World")).unwrap();
        let second = create(&mut store, &editor, draft("Hello, world!")).unwrap();
        assert_eq!(first.slug, "hello-world");
        assert_eq!(second.slug, "hello-world-2");
        assert_eq!(first.status, ArticleStatus::Draft);
        assert_eq!(first.author_id, EDITOR);

        let mut explicit = draft("Another");
        explicit.slug = Some("hello-world".to_string());
        assert!(matches!(
            create(&mut store, &editor, explicit),
            Err(ServiceError::Conflict(_))
        ));

        let viewer = testing::profile(&store, VIEWER);
        assert!(create(&mut store, &viewer, draft("Nope")).is_err());
        assert!(matches!(
            create(&mut store, &editor, draft("   ")),
            Err(ServiceError::Validation { .. })
        ));
    }

    #[test]
    fn publish_lifecycle() {
        let mut store = testing::team();
        let editor = testing::profile(&store, EDITOR);
        let article = create(&mut store, &editor, draft("Launch")).unwrap();

        let published = publish(&mut store, &editor, article.id).unwrap();
        assert!(published.is_live());
        let first_published = published.published_at;
        assert!(first_published.is_some());
        assert_eq!(publish(&mut store, &editor, article.id).unwrap().published_at, first_published);

        let drafted = unpublish(&mut store, &editor, article.id).unwrap();
        assert_eq!(drafted.status, ArticleStatus::Draft);
        assert_eq!(drafted.published_at, None);

        let viewer = testing::profile(&store, VIEWER);
        assert!(publish(&mut store, &viewer, article.id).is_err());
    }

    #[test]
    fn trash_restore_and_purge() {
        let mut store = testing::team();
        let editor = testing::profile(&store, EDITOR);
        let article = create(&mut store, &editor, draft("Old news")).unwrap();

        assert!(matches!(
            purge(&mut store, &editor, article.id),
            Err(ServiceError::Conflict(_))
        ));
        trash(&mut store, &editor, article.id).unwrap();
        assert!(trash(&mut store, &editor, article.id).is_err());
        assert!(publish(&mut store, &editor, article.id).is_err());
        assert!(update(&mut store, &editor, article.id, ArticleUpdate::default()).is_err());

        restore(&mut store, &editor, article.id).unwrap();
        assert!(restore(&mut store, &editor, article.id).is_err());

        let link = NewNavigationItem {
            item: NavigationItem {
                label: "Old".to_string(),
                link: crate::database::models::NavLink::Article { article_id: article.id },
                open_in_new_tab: false,
                visible: true,
            },
            parent_id: None,
            index: None,
        };
        navigation_service::add_item(&mut store, &editor, "main", Revised::new(link)).unwrap();

        trash(&mut store, &editor, article.id).unwrap();
        let purged = purge(&mut store, &editor, article.id).unwrap();
        assert_eq!(purged.links_removed, 1);
        assert!(store.articles.is_empty());
        assert!(store.navigations["main"].items.is_empty());
    }

    #[test]
    fn update_edits_and_guards_status() {
        let mut store = testing::team();
        let editor = testing::profile(&store, EDITOR);
        let article = create(&mut store, &editor, draft("Draft title")).unwrap();
        create(&mut store, &editor, draft("Taken")).unwrap();

        let updated = update(
            &mut store,
            &editor,
            article.id,
            ArticleUpdate {
                title: Some("Final title".to_string()),
                excerpt: Some("Short".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.title, "Final title");
        assert_eq!(updated.slug, "draft-title");

        let clash = update(
            &mut store,
            &editor,
            article.id,
            ArticleUpdate {
                slug: Some("taken".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(clash, Err(ServiceError::Conflict(_))));

        let mut writer = editor.clone();
        writer.permissions = ["articles:update"]
            .iter()
            .filter_map(|k| crate::access::PermissionKey::parse(k).ok())
            .collect();
        let status_change = update(
            &mut store,
            &writer,
            article.id,
            ArticleUpdate {
                status: Some(ArticleStatus::Archived),
                ..Default::default()
            },
        );
        assert!(matches!(status_change, Err(ServiceError::Access(_))));
    }

    #[test]
    fn find_filters_orders_and_counts() {
        let mut store = testing::team();
        let editor = testing::profile(&store, EDITOR);
        for title in ["Alpha", "Beta", "Gamma"] {
            create(&mut store, &editor, draft(title)).unwrap();
        }
        let beta = get(&store, &editor, "beta").unwrap();
        publish(&mut store, &editor, beta.id).unwrap();
        let gamma = get(&store, &editor, "gamma").unwrap();
        trash(&mut store, &editor, gamma.id).unwrap();

        let page = find(&store, &editor, FilterData::default()).unwrap();
        assert_eq!(page.total, 2);

        let data: FilterData = serde_json::from_value(json!({
            "where": { "status": "draft" },
            "include_trashed": true,
            "order": "title asc"
        }))
        .unwrap();
        let page = find(&store, &editor, data).unwrap();
        let titles: Vec<_> = page.items.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Gamma"]);

        let bad: FilterData = serde_json::from_value(json!({ "where": { "title": { "$regex": "a" } } })).unwrap();
        assert!(matches!(find(&store, &editor, bad), Err(ServiceError::Filter(_))));
    }
}
