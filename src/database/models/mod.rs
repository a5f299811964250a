pub mod article;
pub mod member;
pub mod menu;
pub mod navigation;
pub mod role;
pub mod settings;
pub mod team;

pub use article::{Article, ArticleDraft, ArticleStatus, ArticleUpdate};
pub use member::Member;
pub use menu::{default_menu, menu_ids_for_paths, MenuItem, MenuTree};
pub use navigation::{NavLink, Navigation, NavigationItem, NavigationTree};
pub use role::{default_roles, Role};
pub use settings::{SettingsPatch, SiteSettings};
pub use team::Team;
