use super::collection::{keyed_body, prepare, Blogs, Collection, CollectionResource};
use super::Method;
use crate::error::ApiError;
use crate::models::blog::{Blog, BlogsPage};

impl<'a> Collection<'a, Blogs> {
    /// The post list together with the featured post.
    pub fn page(&self) -> Result<BlogsPage, ApiError> {
        let env = self
            .client
            .call(Method::Get, Blogs::PATH, None)?
            .into_success()?;
        Ok(BlogsPage {
            blogs: env.member(Blogs::KEY)?,
            featured_blog: env.member("featuredBlog")?,
        })
    }

    pub fn featured(&self) -> Result<Option<Blog>, ApiError> {
        Ok(self.page()?.featured_blog)
    }

    /// Replace the featured singleton. The plural list is not touched.
    pub fn set_featured(&self, blog: &Blog) -> Result<Option<Blog>, ApiError> {
        let blog = prepare(blog)?;
        let _guard = self.client.guard(Blogs::NAME, "featured")?;
        let body = keyed_body("featuredBlog", &blog)?;
        self.client
            .call(Method::Put, Blogs::PATH, Some(body))?
            .into_success()?
            .member("featuredBlog")
    }
}
