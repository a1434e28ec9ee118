//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod cart_item;
pub mod checkout_session;
pub mod favorite;
pub mod order;
pub mod order_item;
pub mod product;
pub mod product_image;
pub mod profile;
pub mod promotion;

// Re-export specific types to avoid conflicts
pub use cart_item::{Column as CartItemColumn, Entity as CartItem, Model as CartItemModel};
pub use checkout_session::{
    CheckoutStatus, Column as CheckoutSessionColumn, Entity as CheckoutSession,
    Model as CheckoutSessionModel,
};
pub use favorite::{Column as FavoriteColumn, Entity as Favorite, Model as FavoriteModel};
pub use order::{
    Column as OrderColumn, Entity as Order, Model as OrderModel, OrderStatus, PaymentStatus,
};
pub use order_item::{Column as OrderItemColumn, Entity as OrderItem, Model as OrderItemModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use product_image::{
    Column as ProductImageColumn, Entity as ProductImage, Model as ProductImageModel,
};
pub use profile::{Column as ProfileColumn, Entity as Profile, Model as ProfileModel, Role};
pub use promotion::{Column as PromotionColumn, Entity as Promotion, Model as PromotionModel};
