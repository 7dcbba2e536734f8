pub use super::categories::Entity as Categories;
pub use super::materials::Entity as Materials;
